//! Runs a set of processes concurrently and waits for all of them to finish,
//! the way a fixed pipeline spawns its stages: each process gets its own
//! thread, and the launcher joins every thread before returning so a caller
//! never observes a partially-torn-down pipeline.
use std::io;
use std::thread;

/// A unit of work the launcher can run on its own thread.
///
/// A plain `FnOnce() -> io::Result<()> + Send + 'static` closure already
/// implements this via the blanket impl below; implement it directly only
/// when a process needs to be a named type (e.g. to hold channel ends as
/// fields).
pub trait Process: Send {
    /// Runs this process to completion.
    ///
    /// # Errors
    /// Any failure the process wants to report to the launcher, typically a
    /// propagated [`crate::error::ChannelError`] converted to `io::Error`.
    fn run(self: Box<Self>) -> io::Result<()>;
}

impl<F> Process for F
where
    F: FnOnce() -> io::Result<()> + Send,
{
    fn run(self: Box<Self>) -> io::Result<()> {
        (*self)()
    }
}

/// Runs every process in `procs` on its own OS thread, using
/// `thread::Builder::new().spawn`, and joins all of them before returning —
/// a terminal error in one process never short-circuits its siblings, who
/// get to run to completion (or observe the same poison) before the launcher
/// reports anything.
///
/// If more than one process fails (by returning `Err` or by panicking), the
/// first failure in process order is returned; the rest are logged and
/// discarded. "First error wins, but still join everyone" keeps the
/// reported failure deterministic without needing every process to agree
/// on who failed first.
///
/// # Errors
/// The first `Err` returned by any process, or an `io::Error` synthesized
/// from the first process that panicked, or the first `thread::Builder::spawn`
/// failure if a thread itself could not be created.
pub fn parallel(procs: Vec<Box<dyn Process>>) -> io::Result<()> {
    let mut handles = Vec::with_capacity(procs.len());
    let mut spawn_err = None;

    for (index, process) in procs.into_iter().enumerate() {
        match thread::Builder::new()
            .name(format!("alt-process-{index}"))
            .spawn(move || process.run())
        {
            Ok(handle) => handles.push(Some(handle)),
            Err(err) => {
                log::warn!("parallel: failed to spawn process {index}: {err}");
                spawn_err.get_or_insert(err);
                handles.push(None);
            }
        }
    }

    let mut first_err = spawn_err;
    for (index, handle) in handles.into_iter().enumerate() {
        let Some(handle) = handle else { continue };
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                log::warn!("parallel: process {index} returned an error: {err}");
                first_err.get_or_insert(err);
            }
            Err(_panic) => {
                log::warn!("parallel: process {index} panicked");
                first_err.get_or_insert(io::Error::new(
                    io::ErrorKind::Other,
                    format!("process {index} panicked"),
                ));
            }
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
