//! Write HTTP access log files in the Combined Log Format (extended
//! Common Log Format) for access logs (Apache style), as per
//! <https://httpd.apache.org/docs/2.4/logs.html>.

use std::mem::swap;
use std::panic;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, Instant};
use std::io::{stderr, BufWriter, Write};

use anyhow::Result;
use chrono::{DateTime, Utc, Datelike, Timelike};
use rouille::{Response, ResponseBody};

use crate::acontext::AContext;
use crate::util::open_log_output;
use crate::webutils::errorpage_from_error;
use crate::warn;

static MONTHS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun",
                             "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

// "06/Dec/2023:02:02:47 +0000"
pub fn write_time(
    outp: &mut impl Write,
    time: SystemTime
) -> Result<()> {
    let dt: DateTime<Utc> = DateTime::from(time);
    write!(outp, "{:02}/{}/{:04}:{:02}:{:02}:{:02} +0000",
           dt.day(), MONTHS[dt.month0() as usize], dt.year(),
           dt.hour(), dt.minute(), dt.second())?;
    Ok(())
}

/// The body length if known; rouille keeps it private, so take the
/// body apart and put it back together.
fn response_len(response: &mut Response) -> Option<usize> {
    let mut responsebody = ResponseBody::empty();
    swap(&mut responsebody, &mut response.data);
    let (data, length) = responsebody.into_reader_and_size();
    responsebody =
        if let Some(len) = length {
            ResponseBody::from_reader_and_size(data, len)
        } else {
            ResponseBody::from_reader(data)
        };
    swap(&mut responsebody, &mut response.data);
    length
}

// Apache:
// 18.134.151.89 - - [06/Dec/2023:02:02:47 +0100] "GET /login.jsp HTTP/1.1" 404 447 "-" "..."
// We also add the duration at the end.

/// Write an access log entry.
pub fn write_combined(
    outp: &mut impl Write,
    context: &AContext,
    duration: Duration,
    response: &mut Response, // temporarily swaps out ResponseBody and back
) -> Result<()> {
    // The time the request was received, as Apache does
    write!(outp, "{} - - [", context.client_ip())?;
    write_time(outp, context.now())?;
    let len = response_len(response);
    writeln!(outp, "] {:?} {} {} {:?} {:?} {duration:?}",
             context.request_line(),
             response.status_code,
             len.unwrap_or(0),
             context.referer().unwrap_or("-"),
             context.user_agent().unwrap_or("-")
    )?;
    outp.flush()?;
    Ok(())
}

/// Write an error log entry.
fn write_error(
    outp: &mut impl Write,
    context: &AContext,
    duration: Duration,
    err: &anyhow::Error,
) -> Result<()> {
    let now = SystemTime::now();
    write!(outp, "[")?;
    write_time(outp, now)?;
    writeln!(outp, "] [error] [client {}] [host {}] {:?} {duration:?}: {err:#}",
             context.client_ip(),
             context.host_or_listen_addr(),
             context.request_line())?;
    outp.flush()?;
    Ok(())
}

/// Panic log to stderr; stderr is collected by the supervisor, hence
/// no timestamp.
fn write_panic_stderr(
    context: &AContext,
    duration: Duration
) {
    let mut outp = BufWriter::new(stderr().lock());
    let _ = writeln!(&mut outp, "[panic] handling {:?} after {duration:?}",
                     context.request_line());
    let _ = outp.flush();
}


// rouille::log_custom can't be used: the log files and the handler's
// error are only known inside the handler. Thus adapt its code here.

/// The log files to write to: access_log if a response was made,
/// error_log if the handler failed. Should do buffering, the code
/// calls flush once per entry.
pub struct Logs {
    pub access_log: Box<dyn Write + Send + Sync>,
    pub error_log: Box<dyn Write + Send + Sync>,
}

impl Logs {
    pub fn open_in_basedir(
        logbasedir: &str,
        is_https: bool
    ) -> Result<Arc<Mutex<Logs>>>
    {
        let s = if is_https { "s" } else { "" };
        Ok(Arc::new(Mutex::new(Logs {
            access_log: open_log_output(
                format!("{logbasedir}/http{s}_access.log"))?,
            error_log: open_log_output(
                format!("{logbasedir}/http{s}_error.log"))?,
        })))
    }
}


pub fn log_combined<F>(
    context: &AContext,
    handler: F
) -> Response
where
    F: FnOnce() -> (Arc<Mutex<Logs>>, anyhow::Result<Response>),
{
    let start_instant = Instant::now();

    // Call the handler and catch panics; unwinding is resumed
    // afterwards.
    let result = panic::catch_unwind(panic::AssertUnwindSafe(handler));
    let elapsed = start_instant.elapsed();

    match result {
        Ok((logs, result)) => {
            // A panic while writing a previous entry poisons the
            // lock; the log files are still usable.
            let mut logs = logs.lock().unwrap_or_else(|e| e.into_inner());
            match result {
                Ok(mut response) => {
                    if let Err(e) = write_combined(
                        &mut logs.access_log, context, elapsed, &mut response)
                    {
                        warn!("could not write to access log: {e:#}")
                    }
                    response
                }
                Err(err) => {
                    if let Err(e) = write_error(&mut logs.error_log, context, elapsed, &err) {
                        warn!("could not write to error log: {e:#}")
                    }
                    errorpage_from_error(&err)
                }
            }
        }
        Err(payload) => {
            write_panic_stderr(context, elapsed);
            // The panic handler will print the payload contents
            panic::resume_unwind(payload);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_write_time() -> Result<()> {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1701828167);
        let mut out = Vec::new();
        write_time(&mut out, t)?;
        assert_eq!(String::from_utf8(out)?, "06/Dec/2023:02:02:47 +0000");
        Ok(())
    }

    #[test]
    fn t_write_combined() -> Result<()> {
        let request = rouille::Request::fake_http(
            "GET", "/services", vec![("User-Agent".into(), "curl/8".into())], vec![]);
        let context = AContext::new(&request, "127.0.0.1:3000")?;
        let mut response = Response::text("hello");
        let mut out = Vec::new();
        write_combined(&mut out, &context, Duration::from_millis(3), &mut response)?;
        let mut time = Vec::new();
        write_time(&mut time, context.now())?;
        assert_eq!(String::from_utf8(out)?,
                   format!("{} - - [{}] \"GET /services\" 200 5 \"-\" \"curl/8\" 3ms\n",
                           context.client_ip(), String::from_utf8(time)?));
        Ok(())
    }

    #[test]
    fn t_response_len() {
        let mut r = Response::text("hello");
        assert_eq!(response_len(&mut r), Some(5));
        assert_eq!(response_len(&mut r), Some(5));
    }
}
