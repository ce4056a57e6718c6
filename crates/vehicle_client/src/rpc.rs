//! msgpack-rpc transport
//!
//! Request: `[0, msgid, method, params]`, response: `[1, msgid, error, result]`.
//! Structs inside params are encoded as maps, matching AirSim's
//! `MSGPACK_DEFINE_MAP` adaptors.

use std::io::{self, Cursor};
use std::sync::atomic::{AtomicU32, Ordering};

use bytes::{Buf, BytesMut};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::error::{Result, VehicleError};

const REQUEST: u8 = 0;
const RESPONSE: u8 = 1;

/// Error slot of a response: usually a message string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteError {
    Message(String),
    Other(IgnoredAny),
}

impl RemoteError {
    fn into_message(self) -> String {
        match self {
            Self::Message(message) => message,
            Self::Other(_) => "remote error".to_string(),
        }
    }
}

/// Encode one request frame
pub(crate) fn encode_request<P: Serialize>(id: u32, method: &str, params: &P) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(&(REQUEST, id, method, params))
        .map_err(|e| VehicleError::protocol(format!("encode '{method}': {e}")))
}

/// Outcome of decoding the front of the read buffer
#[derive(Debug)]
pub(crate) enum Decoded<R> {
    /// Not enough bytes for a full frame yet
    Incomplete,
    /// A complete frame for another request, `len` bytes long
    Stale { id: u32, len: usize },
    /// The awaited response, `len` bytes long
    Response {
        len: usize,
        result: std::result::Result<Option<R>, String>,
    },
}

fn is_eof(err: &rmp_serde::decode::Error) -> bool {
    use rmp_serde::decode::Error;
    match err {
        Error::InvalidMarkerRead(e) | Error::InvalidDataRead(e) => {
            e.kind() == io::ErrorKind::UnexpectedEof
        }
        _ => false,
    }
}

/// Decode the response frame at the start of `buf`
pub(crate) fn decode_response<R: DeserializeOwned>(buf: &[u8], id: u32) -> Result<Decoded<R>> {
    let mut cursor = Cursor::new(buf);
    let header: (u8, u32, IgnoredAny, IgnoredAny) =
        match Deserialize::deserialize(&mut rmp_serde::Deserializer::new(&mut cursor)) {
            Ok(header) => header,
            Err(e) if is_eof(&e) => return Ok(Decoded::Incomplete),
            Err(e) => return Err(VehicleError::protocol(format!("bad response frame: {e}"))),
        };
    let len = cursor.position() as usize;

    let (kind, frame_id, _, _) = header;
    if kind != RESPONSE {
        return Err(VehicleError::protocol(format!(
            "unexpected message type {kind}"
        )));
    }
    if frame_id != id {
        return Ok(Decoded::Stale { id: frame_id, len });
    }

    let (_, _, error, result): (u8, u32, Option<RemoteError>, Option<R>) =
        rmp_serde::from_slice(&buf[..len])
            .map_err(|e| VehicleError::protocol(format!("bad response payload: {e}")))?;

    let result = match error {
        Some(error) => Err(error.into_message()),
        None => Ok(result),
    };
    Ok(Decoded::Response { len, result })
}

struct Transport {
    stream: TcpStream,
    buffer: BytesMut,
}

/// One msgpack-rpc session
///
/// Calls are serialized through the transport lock; responses to abandoned
/// (timed out) requests are skipped by id.
pub(crate) struct RpcSession {
    transport: Mutex<Option<Transport>>,
    next_id: AtomicU32,
}

impl RpcSession {
    pub(crate) fn new() -> Self {
        Self {
            transport: Mutex::new(None),
            next_id: AtomicU32::new(0),
        }
    }

    pub(crate) async fn connect(&self, host: &str, port: u16) -> Result<()> {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| VehicleError::connection(format!("{host}:{port}: {e}")))?;
        stream.set_nodelay(true)?;

        *self.transport.lock().await = Some(Transport {
            stream,
            buffer: BytesMut::with_capacity(64 * 1024),
        });
        Ok(())
    }

    /// Issue `method` and wait for its response
    ///
    /// # Errors
    /// `CommandRejected` when the server reports an error.
    pub(crate) async fn call<P, R>(&self, method: &str, params: P) -> Result<Option<R>>
    where
        P: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = encode_request(id, method, &params)?;

        let mut guard = self.transport.lock().await;
        let transport = guard.as_mut().ok_or(VehicleError::NotConnected)?;

        trace!(method, id, bytes = request.len(), "rpc request");
        transport.stream.write_all(&request).await?;

        loop {
            match decode_response::<R>(&transport.buffer, id)? {
                Decoded::Incomplete => {
                    let read = transport.stream.read_buf(&mut transport.buffer).await?;
                    if read == 0 {
                        return Err(VehicleError::connection("connection closed by simulator"));
                    }
                }
                Decoded::Stale { id: stale, len } => {
                    warn!(method, expected = id, stale, "skipping stale rpc response");
                    transport.buffer.advance(len);
                }
                Decoded::Response { len, result } => {
                    transport.buffer.advance(len);
                    debug!(method, id, "rpc response");
                    return result.map_err(|message| VehicleError::rejected(method, message));
                }
            }
        }
    }
}
