//! Encoding utilities. Available only with the `encoding` feature.

use akao_yaml_parser::{ErrorType, Marker, ParseError};
use encoding_rs::{Decoder, DecoderResult, Encoding};

/// The behavior the decoder should have when encountering an invalid character sequence.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DecodingTrap {
    /// Ignore the offending bytes, remove them from the output.
    Ignore,
    /// Error out.
    #[default]
    Strict,
    /// Replace them with the Unicode REPLACEMENT CHARACTER.
    Replace,
}

/// Decode `bytes` into text.
///
/// The encoding is detected from the byte order mark if there is one, and otherwise guessed
/// between UTF-16 (little or big endian) and UTF-8 from the first two bytes. The byte order mark
/// is not part of the output.
///
/// # Errors
/// With [`DecodingTrap::Strict`], returns an [`ErrorType::Encoding`] error located at the first
/// invalid character sequence.
pub fn decode(bytes: &[u8], trap: DecodingTrap) -> Result<String, ParseError> {
    // Check if the `encoding` library can detect encoding from the BOM, otherwise use
    // `detect_utf16_endianness`.
    let (encoding, _) =
        Encoding::for_bom(bytes).unwrap_or_else(|| (detect_utf16_endianness(bytes), 2));
    let mut decoder = encoding.new_decoder();
    let mut output = String::new();
    decode_loop(bytes, &mut output, &mut decoder, trap)?;
    Ok(output)
}

fn decode_loop(
    input: &[u8],
    output: &mut String,
    decoder: &mut Decoder,
    trap: DecodingTrap,
) -> Result<(), ParseError> {
    let mut total_bytes_read = 0;
    reserve_for(output, decoder, input.len());

    loop {
        match decoder.decode_to_string_without_replacement(&input[total_bytes_read..], output, true)
        {
            // If the input is empty, we processed the whole input.
            (DecoderResult::InputEmpty, _) => break Ok(()),
            // If the output is full, we must reallocate.
            (DecoderResult::OutputFull, bytes_read) => {
                total_bytes_read += bytes_read;
                reserve_for(output, decoder, input.len() - total_bytes_read);
            }
            (DecoderResult::Malformed(malformed_len, bytes_after_malformed), bytes_read) => {
                total_bytes_read += bytes_read;
                match trap {
                    DecodingTrap::Ignore => {}
                    DecodingTrap::Replace => output.push('\u{FFFD}'),
                    DecodingTrap::Strict => {
                        let malformed_len = malformed_len as usize;
                        let byte_idx =
                            total_bytes_read - (malformed_len + bytes_after_malformed as usize);
                        let malformed_sequence = &input[byte_idx..byte_idx + malformed_len];
                        break Err(ParseError::new(
                            ErrorType::Encoding,
                            marker_at_end(output, byte_idx),
                            format!(
                                "invalid character sequence at byte {byte_idx}: {malformed_sequence:?}"
                            ),
                        )
                        .with_suggestion("save the file as UTF-8 or UTF-16"));
                    }
                }
            }
        }
    }
}

/// Make room in `output` for the worst-case decoding of `remaining` input bytes.
///
/// The decoder reports [`DecoderResult::OutputFull`] without progressing until the spare capacity
/// covers that worst case.
fn reserve_for(output: &mut String, decoder: &Decoder, remaining: usize) {
    let needed = decoder
        .max_utf8_buffer_length_without_replacement(remaining)
        .unwrap_or(remaining.saturating_mul(3))
        .max(16);
    output.reserve(needed);
}

/// Locate the end of the text decoded so far. `index` is the offset in the input bytes.
fn marker_at_end(output: &str, index: usize) -> Marker {
    let line_start = output.rfind('\n').map_or(0, |i| i + 1);
    Marker::new(
        index,
        output.matches('\n').count() + 1,
        output[line_start..].chars().count() + 1,
    )
}

// The YAML spec says that the encoding of a document without BOM can be detected by looking at
// the position of the null bytes among the first characters, which are ASCII.
fn detect_utf16_endianness(b: &[u8]) -> &'static Encoding {
    if b.len() > 1 && (b[0] != b[1]) {
        if b[0] == 0 {
            return encoding_rs::UTF_16BE;
        } else if b[1] == 0 {
            return encoding_rs::UTF_16LE;
        }
    }
    encoding_rs::UTF_8
}
