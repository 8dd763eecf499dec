//! Diagnostic output to stderr.

//! Lines are prefixed with a level letter and suffixed with the
//! source location; stderr is expected to be collected by the service
//! supervisor, hence no timestamps.

use std::sync::atomic::AtomicBool;

/// Set to false to silence `info!` (e.g. in tests or batch tools).
pub static DO_INFO: AtomicBool = AtomicBool::new(true);

#[macro_export]
macro_rules! warn {
    ($formatstr:expr $(,$arg:expr)*) => { {
        use std::io::Write;
        let mut outp = std::io::BufWriter::new(std::io::stderr().lock());
        let _ = write!(&mut outp, "W: ");
        let _ = write!(&mut outp, $formatstr $(,$arg)*);
        let _ = writeln!(&mut outp, " at {:?} line {}", file!(), line!());
        let _ = outp.flush();
    } }
}

#[macro_export]
macro_rules! info {
    ($formatstr:expr $(,$arg:expr)*) => { {
        if $crate::warn::DO_INFO.load(std::sync::atomic::Ordering::Relaxed) {
            use std::io::Write;
            let mut outp = std::io::BufWriter::new(std::io::stderr().lock());
            let _ = write!(&mut outp, "I: ");
            let _ = write!(&mut outp, $formatstr $(,$arg)*);
            let _ = writeln!(&mut outp);
            let _ = outp.flush();
        }
    } }
}


/// Reports the time spent until the end of the enclosing scope.
pub struct TimeGuard<S: std::fmt::Debug> {
    pub name: S,
    pub start: std::time::Instant,
}

impl<S: std::fmt::Debug> Drop for TimeGuard<S> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        crate::info!("time {:?}: {elapsed:?}", self.name);
    }
}

#[macro_export]
macro_rules! time_guard {
    ($namestr:expr) => {
        let _guard = $crate::warn::TimeGuard {
            name: $namestr,
            start: std::time::Instant::now()
        };
    }
}

