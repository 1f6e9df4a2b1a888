mod session;

pub use session::SketchSession;
