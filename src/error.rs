// Chope — Audio seam errors
//
// Nothing here ever escapes the tick loop: the controller logs these and
// falls back to idle.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    /// Clip file missing or unreadable.
    #[error("cannot open clip {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Stream opened but the decoder refused it (bad header, no audio track…).
    #[error("decoder rejected stream: {0}")]
    Begin(String),

    /// Packet could not be decoded; ends the clip.
    #[error("decode error: {0}")]
    Decode(String),

    /// Output sink refused samples.
    #[error("audio output error: {0}")]
    Output(String),
}
