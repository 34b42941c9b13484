mod capture_pipe;

pub use capture_pipe::CapturePipe;
