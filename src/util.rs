use std::{env::VarError, ffi::OsStr, fs::{create_dir_all, File}, io::BufWriter,
          path::PathBuf, time::Duration};

use anyhow::{Result, anyhow, Context, bail};


/// Similar to `?` in a context that returns `Option`, this propagates
/// `None` values, but wraps them in `Ok`. I.e. behaves like `?`
/// except if the `Option` context is wrapped in a `Result`.
#[macro_export]
macro_rules! or_return_none {
    ($e:expr) => {{
        let res = $e;
        if let Some(val) = res {
            val
        } else {
            return Ok(None)
        }
    }}
}


/// Run the body (which must evaluate to `Result<()>`) forever. After
/// errors, sleep for a duration that grows by 20% with every
/// consecutive error, capped at a minute.
#[macro_export]
macro_rules! loop_try {
    ( $($body_parts:tt)* ) => {{
        let default_error_sleep_duration = std::time::Duration::from_millis(500);
        let max_error_sleep_duration = std::time::Duration::from_secs(60);
        let mut error_sleep_duration = default_error_sleep_duration;
        loop {
            match (|| -> anyhow::Result<()> { $($body_parts)* })() {
                Ok(()) => {
                    error_sleep_duration = default_error_sleep_duration;
                }
                Err(e) => {
                    $crate::warn!("loop_try: got error {e:#}, sleeping for \
                                   {error_sleep_duration:?}");
                    std::thread::sleep(error_sleep_duration);
                    error_sleep_duration =
                        $crate::util::duration_mul_div(error_sleep_duration, 1200, 1000)
                        .unwrap_or(default_error_sleep_duration)
                        .min(max_error_sleep_duration);
                }
            }
        }
    }}
}

/// A 12 character (6 entropy bytes) long hex string to tag error
/// messages for identification.
pub fn randomidstring() -> Result<String, getrandom::Error> {
    let mut buf = [0u8; 6];
    getrandom::getrandom(&mut buf)?;
    Ok(buf.iter().map(|byte| format!("{:02X}", byte)).collect())
}

/// Open a file for appending, creating it (and its parent dir) if
/// necessary.
pub fn open_log_output(path: impl Into<PathBuf>) -> Result<Box<BufWriter<File>>> {
    let path: PathBuf = path.into();
    if let Some(parent) = path.parent() {
        create_dir_all(parent).with_context(
            || anyhow!("creating log dir {:?}", parent.to_string_lossy()))?;
    }
    let file = File::options().append(true).create(true).open(&path).with_context(
        || anyhow!("opening log for output: {:?}", path.to_string_lossy()))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Multiply a duration by `multiplier / divider`, e.g. for backing
/// off. None on overflow.
pub fn duration_mul_div(orig: Duration, multiplier: u64, divider: u64)
                        -> Option<Duration>
{
    let nanos: u64 = orig.as_nanos().checked_mul(multiplier as u128)?
        .checked_div(divider as u128)?
        .try_into().ok()?;
    Some(Duration::from_nanos(nanos))
}


fn osstr_to_str(s: &OsStr) -> Result<&str> {
    s.to_str().ok_or_else(
        || anyhow!("can't properly decode to string {:?}", s.to_string_lossy()))
}

pub fn program_name() -> Result<String> {
    let path = std::env::args_os().next().ok_or_else(
        || anyhow!("missing program executable path in args_os"))?;
    let pb = PathBuf::from(path);
    let fname = pb.file_name().ok_or_else(
        || anyhow!("cannot get file name from path {:?}", pb.to_string_lossy()))?;
    Ok(osstr_to_str(fname)?.to_string())
}

/// The directory for the access and error logs: `LOGDIR` if set,
/// otherwise `$HOME/log/<program name>`. Created if missing.
pub fn log_basedir() -> Result<String> {
    let logbasedir = match getenv("LOGDIR")? {
        Some(dir) => dir,
        None => format!("{}/log/{}",
                        xgetenv("HOME")?,
                        program_name()?)
    };
    create_dir_all(&logbasedir).with_context(
        || anyhow!("can't create log base directory {:?}", logbasedir))?;
    Ok(logbasedir)
}

/// Get an env var as a String; decoding failures are reported as
/// errors. If the var is not set and no fallback was given, an error
/// is reported as well.
pub fn getenv_or(name: &str, fallbackvalue: Option<&str>) -> Result<String> {
    match getenv(name)? {
        Some(s) => Ok(s),
        None => match fallbackvalue {
            Some(v) => Ok(v.to_string()),
            None => bail!("{name:?} env var is missing and no default provided"),
        }
    }
}

/// Get an env var as a String; decoding failures are reported as
/// errors. Empty values count as missing.
pub fn getenv(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(s) if s.is_empty() => Ok(None),
        Ok(s) => Ok(Some(s)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => bail!("{name:?} env var is not unicode"),
    }
}

/// Like getenv but reports an error mentioning the variable name if
/// it isn't set.
pub fn xgetenv(name: &str) -> Result<String> {
    getenv(name)?.ok_or_else(
        || anyhow!("missing env var {name:?}"))
}

/// Parse an env var via `FromStr`, with a fallback when it's not set.
pub fn getenv_parsed<T>(name: &str, fallback: T) -> Result<T>
where T: std::str::FromStr,
      T::Err: std::fmt::Display
{
    match getenv(name)? {
        Some(s) => s.trim().parse().map_err(
            |e| anyhow!("invalid value for {name:?} env var: {s:?}: {e}")),
        None => Ok(fallback)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_duration_mul_div() {
        assert_eq!(duration_mul_div(Duration::from_millis(500), 1200, 1000),
                   Some(Duration::from_millis(600)));
        assert_eq!(duration_mul_div(Duration::from_secs(1), 1, 0), None);
    }

    #[test]
    fn t_randomidstring() -> Result<()> {
        let a = randomidstring()?;
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, randomidstring()?);
        Ok(())
    }

    #[test]
    fn t_getenv_parsed() -> Result<()> {
        std::env::set_var("WEBSITE_TEST_GETENV_PARSED", " 17 ");
        assert_eq!(getenv_parsed("WEBSITE_TEST_GETENV_PARSED", 3u64)?, 17);
        std::env::set_var("WEBSITE_TEST_GETENV_PARSED", "x");
        assert!(getenv_parsed("WEBSITE_TEST_GETENV_PARSED", 3u64).is_err());
        assert_eq!(getenv_parsed("WEBSITE_TEST_GETENV_UNSET", 3u64)?, 3);
        Ok(())
    }
}
