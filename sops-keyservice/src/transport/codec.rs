//! The wire framing: little-endian u32 length prefix, one JSON envelope
//! per frame.

use tokio_util::codec::LengthDelimitedCodec;

pub fn framed_codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_type::<u32>()
        .little_endian()
        .new_codec()
}
