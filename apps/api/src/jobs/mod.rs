// Job API: creation, upload, start, status and results.
// The registry is the only owner of job state; handlers and the pipeline task
// go through it.

pub mod handlers;
pub mod registry;
