//! Operator interaction for the first-run authorization.

use std::io::{self, BufRead, Write};
use std::thread;

use classcord_core::BoxFuture;
use tokio::sync::oneshot;
use tracing::warn;

/// The text channel between the credential manager and a human.
///
/// One outbound message (the authorization URL) and one inbound line (the
/// code). Implementations may use a console, a pipe or anything else.
pub trait CodePrompt: Send {
    /// Shows the authorization URL to the operator.
    fn present(&mut self, url: &str) -> io::Result<()>;

    /// Waits for the operator to enter the authorization code.
    ///
    /// Returns `Ok(None)` if the input was closed without a line.
    fn read_code(&mut self) -> BoxFuture<'_, io::Result<Option<String>>>;
}

/// Console prompt: URL on stdout, code from stdin.
#[derive(Debug, Default)]
pub struct ConsolePrompt {
    open_browser: bool,
}

impl ConsolePrompt {
    /// Creates a console prompt that only prints the URL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also try to open the URL in the default browser.
    pub fn with_open_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }
}

impl CodePrompt for ConsolePrompt {
    fn present(&mut self, url: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "Authorize this app by visiting this url:")?;
        writeln!(out)?;
        writeln!(out, "{}", url)?;
        writeln!(out)?;

        if self.open_browser
            && let Err(e) = open::that(url)
        {
            warn!("failed to open browser: {}", e);
        }

        write!(out, "Enter the code from that page here: ")?;
        out.flush()
    }

    fn read_code(&mut self) -> BoxFuture<'_, io::Result<Option<String>>> {
        Box::pin(async move {
            // A detached thread, not the blocking pool: runtime shutdown
            // waits on blocking tasks, and an abandoned read must not stall it.
            let (tx, rx) = oneshot::channel();
            thread::Builder::new()
                .name("classcord-stdin".to_string())
                .spawn(move || {
                    let mut line = String::new();
                    let read = io::stdin()
                        .lock()
                        .read_line(&mut line)
                        .map(|n| if n == 0 { None } else { Some(line) });
                    let _ = tx.send(read);
                })?;
            rx.await.map_err(io::Error::other)?
        })
    }
}
