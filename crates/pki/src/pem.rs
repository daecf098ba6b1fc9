//! PEM block location.
//!
//! Inputs from collaborators often carry surrounding text (a trailing newline,
//! a leading comment, a second block). The first complete block is decoded and
//! everything around it is ignored.
//!
//! The body is decoded leniently: line width, CRLF line endings and other
//! whitespace inside the block do not matter. Mobile clients commonly emit the
//! whole base64 body on a single line.

use base64::{engine::general_purpose::STANDARD, Engine};
use zeroize::Zeroizing;

const BEGIN_MARKER: &str = "-----BEGIN ";
const DASHES: &str = "-----";

/// A decoded PEM block.
#[derive(Debug)]
pub(crate) struct PemBlock {
    pub label: String,
    pub der: Vec<u8>,
}

/// Locate and decode the first PEM block in `input`.
///
/// Returns a human-readable reason when no well-formed block is found.
pub(crate) fn decode_first_block(input: &str) -> Result<PemBlock, String> {
    let start = input
        .find(BEGIN_MARKER)
        .ok_or_else(|| "no PEM block found".to_string())?;
    let rest = &input[start..];

    let label_start = BEGIN_MARKER.len();
    let label_len = rest[label_start..]
        .find(DASHES)
        .ok_or_else(|| "unterminated BEGIN line".to_string())?;
    let label = &rest[label_start..label_start + label_len];
    let body_start = label_start + label_len + DASHES.len();

    let end_line = format!("-----END {}-----", label);
    let end = rest[body_start..]
        .find(&end_line)
        .map(|offset| body_start + offset)
        .ok_or_else(|| format!("missing END line for {}", label))?;

    // Private key blocks pass through here too
    let body: Zeroizing<String> = Zeroizing::new(
        rest[body_start..end]
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect(),
    );
    if body.is_empty() {
        return Err(format!("empty {} block", label));
    }

    let der = STANDARD
        .decode(body.as_bytes())
        .map_err(|e| format!("malformed {} block: {}", label, e))?;

    Ok(PemBlock {
        label: label.to_string(),
        der,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: &str = "-----BEGIN PUBLIC KEY-----\n\
        MCowBQYDK2VwAyEAAdebLIZ7YH/CvO8VXvkmLxOKL94HOcLTG8wtA0SqN3M=\n\
        -----END PUBLIC KEY-----";

    const P256_BODY: &str = "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAETVfO7lsmVpMg1yGaRaCpEfXChGFN\
        MKXicicm3WWhz1BEqrToUd7rs5BAwVtbS52LQga696S3pEiPHy5e/Nm1uA==";

    fn wrap(body: &str, width: usize, newline: &str) -> String {
        let lines: Vec<&str> = body
            .as_bytes()
            .chunks(width)
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect();
        format!(
            "-----BEGIN PUBLIC KEY-----{nl}{}{nl}-----END PUBLIC KEY-----{nl}",
            lines.join(newline),
            nl = newline
        )
    }

    #[test]
    fn test_decode_plain_block() {
        let block = decode_first_block(BLOCK).unwrap();
        assert_eq!(block.label, "PUBLIC KEY");
        assert_eq!(block.der.len(), 44);
    }

    #[test]
    fn test_decode_ignores_surrounding_text() {
        let input = format!("subject key follows\n\n{}\n\ntrailing", BLOCK);
        let block = decode_first_block(&input).unwrap();
        assert_eq!(block.label, "PUBLIC KEY");
    }

    #[test]
    fn test_decode_any_line_width() {
        let expected = decode_first_block(&wrap(P256_BODY, 64, "\n")).unwrap().der;
        assert_eq!(expected.len(), 91);

        for (width, newline) in [(P256_BODY.len(), "\n"), (76, "\n"), (64, "\r\n"), (40, "\r\n")] {
            let block = decode_first_block(&wrap(P256_BODY, width, newline)).unwrap();
            assert_eq!(block.der, expected, "width {} failed", width);
        }
    }

    #[test]
    fn test_missing_block() {
        assert!(decode_first_block("").is_err());
        assert!(decode_first_block("MCowBQYDK2VwAyEA").is_err());
    }

    #[test]
    fn test_missing_end_line() {
        let input = "-----BEGIN PUBLIC KEY-----\nMCowBQYDK2VwAyEA\n";
        assert!(decode_first_block(input).is_err());
    }

    #[test]
    fn test_empty_body() {
        let input = "-----BEGIN PUBLIC KEY-----\n-----END PUBLIC KEY-----";
        assert!(decode_first_block(input).is_err());
    }

    #[test]
    fn test_bad_base64_body() {
        let input = "-----BEGIN PUBLIC KEY-----\n!!!!\n-----END PUBLIC KEY-----";
        assert!(decode_first_block(input).is_err());
    }
}
