//! Newline-delimited JSON over a Unix socket: one request per line, one
//! response per line.

use crate::bridge::{Bridge, BridgeError, DialogOptions, DialogSelection};
use crate::pane::FileStats;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use thiserror::Error;

/// Request sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    /// Check if server is alive
    Ping,
    /// Write `content` to `filename`
    SaveFile { filename: PathBuf, content: String },
    /// Ask the user for a destination path
    SaveDialog { options: DialogOptions },
    /// Ask the user for a file to open
    OpenDialog { options: DialogOptions },
    /// Read metadata for a file
    FileStats { filename: PathBuf },
    /// Read a file's text content
    ReadFile { filename: PathBuf },
}

/// Response sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
            result: None,
        }
    }

    pub fn with_result(result: impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self {
                ok: true,
                error: None,
                result: Some(value),
            },
            Err(e) => Self::error(format!("Failed to encode result: {}", e)),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(msg.into()),
            result: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("another instance is already running on socket: {0}")]
    AlreadyRunning(PathBuf),
    #[error("failed to remove stale socket {path}: {source}")]
    StaleSocket { path: PathBuf, source: io::Error },
    #[error("failed to bind socket {path}: {source}")]
    Bind { path: PathBuf, source: io::Error },
}

/// A pending IPC request with a channel to send the response back
pub struct PendingRequest {
    pub request: Request,
    response_tx: Sender<Response>,
}

impl PendingRequest {
    /// Send a response back to the client
    pub fn respond(self, response: Response) {
        let _ = self.response_tx.send(response);
    }
}

/// Handle for the owning thread to receive IPC requests
pub struct IpcHandle {
    request_rx: Receiver<PendingRequest>,
}

impl IpcHandle {
    /// Block until the next request arrives. `None` once the listener is gone.
    pub fn wait(&self) -> Option<PendingRequest> {
        self.request_rx.recv().ok()
    }
}

/// Start the IPC server in a background thread.
/// Returns a handle for the owning thread to receive requests.
pub fn start_ipc_server(socket_path: impl AsRef<Path>) -> Result<IpcHandle, ServerError> {
    let socket_path = socket_path.as_ref().to_path_buf();

    if socket_path.exists() {
        // A live listener answers; a stale file does not
        if UnixStream::connect(&socket_path).is_ok() {
            return Err(ServerError::AlreadyRunning(socket_path));
        }
        std::fs::remove_file(&socket_path).map_err(|source| ServerError::StaleSocket {
            path: socket_path.clone(),
            source,
        })?;
    }

    let listener = UnixListener::bind(&socket_path).map_err(|source| ServerError::Bind {
        path: socket_path.clone(),
        source,
    })?;

    log::info!("IPC server listening on: {}", socket_path.display());

    let (request_tx, request_rx) = mpsc::channel();
    let socket_path_clone = socket_path.clone();

    thread::spawn(move || {
        struct Cleanup(PathBuf);
        impl Drop for Cleanup {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.0);
            }
        }
        let _cleanup = Cleanup(socket_path_clone);

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let request_tx = request_tx.clone();
                    thread::spawn(move || {
                        if let Err(e) = handle_client(stream, request_tx) {
                            log::debug!("IPC client disconnected: {}", e);
                        }
                    });
                }
                Err(e) => {
                    log::error!("IPC accept error: {}", e);
                }
            }
        }
    });

    Ok(IpcHandle { request_rx })
}

fn handle_client(stream: UnixStream, request_tx: Sender<PendingRequest>) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                let (response_tx, response_rx) = mpsc::channel();
                let pending = PendingRequest {
                    request,
                    response_tx,
                };

                if request_tx.send(pending).is_err() {
                    return Ok(()); // Owner gone
                }
                match response_rx.recv() {
                    Ok(response) => response,
                    Err(_) => return Ok(()),
                }
            }
            Err(e) => Response::error(format!("Invalid request: {}", e)),
        };

        let json = serde_json::to_string(&response).map_err(io::Error::other)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;
    }
}

/// Client for sending requests to a running host
pub struct IpcClient {
    stream: UnixStream,
    reader: BufReader<UnixStream>,
}

impl IpcClient {
    /// Connect to a running host
    pub fn connect(socket_path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let socket_path = socket_path.as_ref();
        let stream = UnixStream::connect(socket_path).map_err(|source| BridgeError::Connect {
            path: socket_path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self { stream, reader })
    }

    /// Send a request and wait for response
    pub fn request(&mut self, req: &Request) -> Result<Response, BridgeError> {
        let json = serde_json::to_string(req)?;
        writeln!(self.stream, "{}", json)?;
        self.stream.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(BridgeError::Closed);
        }

        Ok(serde_json::from_str(&line)?)
    }

    /// Send a ping and check if server is alive
    pub fn ping(&mut self) -> Result<(), BridgeError> {
        self.call(&Request::Ping)
    }

    /// Send a request and decode its result, turning `ok: false` into an error
    fn call<T: DeserializeOwned>(&mut self, req: &Request) -> Result<T, BridgeError> {
        let response = self.request(req)?;
        if !response.ok {
            return Err(BridgeError::Remote(
                response.error.unwrap_or_else(|| "Unknown error".into()),
            ));
        }
        let result = response.result.unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(result)?)
    }
}

/// [`Bridge`] backed by a host process on the other end of a socket
pub struct SocketBridge {
    client: IpcClient,
}

impl SocketBridge {
    pub fn connect(socket_path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        Ok(Self {
            client: IpcClient::connect(socket_path)?,
        })
    }
}

impl Bridge for SocketBridge {
    fn save_file(&mut self, filename: &Path, content: &str) -> Result<(), BridgeError> {
        self.client.call(&Request::SaveFile {
            filename: filename.to_path_buf(),
            content: content.to_string(),
        })
    }

    fn save_dialog(&mut self, options: &DialogOptions) -> Result<DialogSelection, BridgeError> {
        self.client.call(&Request::SaveDialog {
            options: options.clone(),
        })
    }

    fn open_dialog(&mut self, options: &DialogOptions) -> Result<DialogSelection, BridgeError> {
        self.client.call(&Request::OpenDialog {
            options: options.clone(),
        })
    }

    fn file_stats(&mut self, filename: &Path) -> Result<FileStats, BridgeError> {
        self.client.call(&Request::FileStats {
            filename: filename.to_path_buf(),
        })
    }

    fn read_file(&mut self, filename: &Path) -> Result<String, BridgeError> {
        self.client.call(&Request::ReadFile {
            filename: filename.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_is_tagged_by_cmd() {
        let req = Request::SaveFile {
            filename: "out.txt".into(),
            content: "hello".into(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"cmd": "save_file", "filename": "out.txt", "content": "hello"})
        );
        assert_eq!(serde_json::to_value(Request::Ping).unwrap(), json!({"cmd": "ping"}));
    }

    #[test]
    fn response_skips_empty_fields() {
        assert_eq!(serde_json::to_value(Response::ok()).unwrap(), json!({"ok": true}));
        assert_eq!(
            serde_json::to_value(Response::error("nope")).unwrap(),
            json!({"ok": false, "error": "nope"})
        );
    }

    #[test]
    fn ping_round_trip_over_socket() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("host.sock");
        let handle = start_ipc_server(&socket).unwrap();

        let server = thread::spawn(move || {
            let pending = handle.wait().unwrap();
            assert_eq!(pending.request, Request::Ping);
            pending.respond(Response::ok());
        });

        let mut client = IpcClient::connect(&socket).unwrap();
        client.ping().unwrap();
        server.join().unwrap();
    }

    #[test]
    fn second_server_on_live_socket_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("host.sock");
        let _handle = start_ipc_server(&socket).unwrap();

        let err = start_ipc_server(&socket).err().unwrap();
        assert!(matches!(err, ServerError::AlreadyRunning(_)));
    }

    #[test]
    fn remote_failure_surfaces_as_bridge_error() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("host.sock");
        let handle = start_ipc_server(&socket).unwrap();

        let server = thread::spawn(move || {
            let pending = handle.wait().unwrap();
            pending.respond(Response::error("disk full"));
        });

        let mut bridge = SocketBridge::connect(&socket).unwrap();
        let err = bridge.save_file(Path::new("a.txt"), "x").unwrap_err();
        assert!(matches!(err, BridgeError::Remote(ref msg) if msg == "disk full"));
        server.join().unwrap();
    }

    #[test]
    fn connect_to_missing_socket_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = IpcClient::connect(dir.path().join("nobody.sock")).err().unwrap();
        assert!(matches!(err, BridgeError::Connect { .. }));
    }
}
