use collector_core::AppError;
use collector_core::traits::{Transcoder, is_utf8_label};
use encoding_rs::Encoding;

/// Charset decoder backed by `encoding_rs`.
///
/// Accepts any WHATWG encoding label (`gbk`, `gb2312`, `big5`, `shift_jis`,
/// ...). Malformed byte sequences are replaced rather than rejected, matching
/// how browsers render a mislabelled page.
#[derive(Debug, Clone, Default)]
pub struct EncodingTranscoder;

impl Transcoder for EncodingTranscoder {
    fn transcode(&self, bytes: &[u8], charset: &str) -> Result<String, AppError> {
        if is_utf8_label(charset) {
            return Ok(String::from_utf8_lossy(bytes).into_owned());
        }

        let encoding = Encoding::for_label(charset.trim().as_bytes()).ok_or_else(|| {
            AppError::TranscodeError(format!("Unknown charset label '{charset}'"))
        })?;

        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            tracing::debug!(charset, "Malformed sequences replaced while decoding");
        }
        Ok(text.into_owned())
    }
}
