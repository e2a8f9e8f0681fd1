//! Headless Chrome lifecycle: executable discovery, launch, connect,
//! teardown.
//!
//! The harness owns a single Chrome process for the whole run. If the
//! configured devtools port already accepts connections, the harness
//! connects to that instance instead of launching its own and leaves it
//! running afterwards.

use std::env;
use std::net::TcpStream;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use catalog_harness::config::HarnessConfig;
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures::StreamExt as _;
use tokio::spawn;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Browser with its handler task and, when launched by us, the Chrome
/// process handle.
pub struct BrowserWithHandler {
    pub browser: Browser,
    _handler_task: JoinHandle<()>,
    chrome_process: Option<Child>,
    user_data_dir: Option<tempfile::TempDir>,
}

impl BrowserWithHandler {
    /// Opens a fresh, isolated page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be created.
    pub async fn new_page(&self) -> Result<Page> {
        Ok(self.browser.new_page("about:blank").await?)
    }
}

impl Drop for BrowserWithHandler {
    fn drop(&mut self) {
        if let Some(mut process) = self.chrome_process.take() {
            let _ignore_result = process.kill();
        }
        // The user-data TempDir cleans itself up when dropped.
        self.user_data_dir.take();
    }
}

/// Finds the Chrome executable on the system.
///
/// # Errors
///
/// Returns an error if Chrome cannot be found.
pub fn find_chrome_executable() -> Result<PathBuf> {
    // Check environment variable first
    if let Ok(chrome_bin) = env::var("CHROME_BIN") {
        let path = PathBuf::from(&chrome_bin);
        if path.exists() {
            return Ok(path);
        }
    }

    let path_candidates = ["google-chrome", "chromium", "chromium-browser"];

    for candidate in path_candidates {
        if let Ok(output) = Command::new(candidate).arg("--version").output() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if stdout.contains("Chrome") || stdout.contains("Chromium") {
                return Ok(PathBuf::from(candidate));
            }
        }
    }

    Err(anyhow!(
        "Chrome/Chromium executable not found. Please install Chrome or set CHROME_BIN."
    ))
}

/// Checks if a devtools endpoint is already listening on the port.
fn is_chrome_running(port: u16) -> bool {
    TcpStream::connect(format!("127.0.0.1:{port}")).is_ok()
}

/// Starts a Chrome instance for the harness.
///
/// Images stay enabled (the broken-image assertion needs them to load) and
/// scrollbars are hidden so the viewport's inner width matches the
/// device-metrics override exactly.
///
/// # Errors
///
/// Returns an error if Chrome fails to start or cannot be found.
async fn start_chrome_process(config: &HarnessConfig) -> Result<(Child, tempfile::TempDir)> {
    let chrome_bin = find_chrome_executable()?;
    let port = config.debug_port;

    let user_data_dir = tempfile::Builder::new()
        .prefix("cardcheck-chrome-")
        .tempdir()?;

    let mut chrome_args = vec![
        format!("--remote-debugging-port={port}"),
        format!("--user-data-dir={}", user_data_dir.path().display()),
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-extensions".to_string(),
        "--disable-background-networking".to_string(),
        "--disable-sync".to_string(),
        "--force-device-scale-factor=1".to_string(),
        "--hide-scrollbars".to_string(),
        "--disable-features=OverlayScrollbar".to_string(),
        "--allow-file-access-from-files".to_string(),
        "--force-color-profile=sRGB".to_string(),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--mute-audio".to_string(),
        "--enable-automation".to_string(),
    ];
    if config.headless {
        chrome_args.push("--headless=new".to_string());
    }

    log::info!("Starting Chrome: {} on port {port}", chrome_bin.display());

    let mut process = Command::new(&chrome_bin)
        .args(&chrome_args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| anyhow!("Failed to start Chrome: {err}"))?;

    let max_wait = Duration::from_secs(10);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        if is_chrome_running(port) {
            log::info!("Chrome started successfully on port {port}");
            return Ok((process, user_data_dir));
        }

        if let Ok(Some(status)) = process.try_wait() {
            let mut stderr_str = String::new();
            if let Some(mut stderr) = process.stderr.take() {
                use std::io::Read as _;
                let _ignore = stderr.read_to_string(&mut stderr_str);
            }
            return Err(anyhow!(
                "Chrome process exited unexpectedly with status: {status}\nStderr: {stderr_str}"
            ));
        }

        sleep(Duration::from_millis(100)).await;
    }

    let _ignore_result = process.kill();
    Err(anyhow!("Chrome failed to start within {max_wait:?}"))
}

/// Connects to Chrome on the configured port, launching it first unless an
/// instance is already listening there.
///
/// # Errors
///
/// Returns an error if Chrome fails to start or connection fails.
pub async fn start_and_connect_chrome(config: &HarnessConfig) -> Result<BrowserWithHandler> {
    let port = config.debug_port;

    let (chrome_process, user_data_dir) = if is_chrome_running(port) {
        log::info!("Reusing Chrome already listening on port {port}");
        (None, None)
    } else {
        let (process, dir) = start_chrome_process(config).await?;
        (Some(process), Some(dir))
    };

    let debug_url = format!("http://localhost:{port}");
    let (browser, mut handler) = Browser::connect(&debug_url)
        .await
        .map_err(|err| anyhow!("Failed to connect to Chrome on {debug_url}: {err}"))?;

    // Spawn background handler for Chrome events
    let handler_task = spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(err) = event {
                log::debug!("Browser handler error: {err}");
            }
        }
    });

    Ok(BrowserWithHandler {
        browser,
        _handler_task: handler_task,
        chrome_process,
        user_data_dir,
    })
}
