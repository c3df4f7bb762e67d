use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[derive(thiserror::Error, Debug)]
pub enum FramingError {
    #[error("Reached EOF")]
    Eof,

    #[error("connection closed unexpectedly after {received} of {expected} bytes")]
    UnexpectedEof { received: usize, expected: usize },

    #[error("{0}")]
    Io(#[from] tokio::io::Error),

    #[error("{0}")]
    Utf(#[from] std::string::FromUtf8Error),

    #[error("The payload is too long for a single frame")]
    TooLong,
}

/// Reads one complete message from the stream
///
/// a message is a 2-byte big-endian length followed by that many bytes of
/// UTF-8 text. a peer that closes the connection between messages produces
/// `Eof`; closing in the middle of a frame produces `UnexpectedEof`.
pub async fn read_message<R>(reader: &mut R) -> Result<String, FramingError>
where
    R: AsyncReadExt + Unpin,
{
    let mut header = [0u8; 2];
    match read_full(reader, &mut header).await {
        Ok(()) => {}
        Err(FramingError::UnexpectedEof { received: 0, .. }) => return Err(FramingError::Eof),
        Err(err) => return Err(err),
    }
    let length = u16::from_be_bytes(header) as usize;

    let mut payload = vec![0u8; length];
    read_full(reader, &mut payload).await?;

    Ok(String::from_utf8(payload)?)
}

/// Writes one complete message to the stream
///
/// the payload is framed with the same 2-byte big-endian length prefix the
/// read side expects.
pub async fn write_message<W>(writer: &mut W, payload: &str) -> Result<(), FramingError>
where
    W: AsyncWriteExt + Unpin,
{
    let length: u16 = payload.len().try_into().map_err(|_| FramingError::TooLong)?;

    let mut frame = Vec::with_capacity(2 + payload.len());
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend_from_slice(payload.as_bytes());

    writer.write_all(&frame).await?;
    writer.flush().await?;

    Ok(())
}

// fills the entire buffer, looping over however many reads it takes
// a single receive may return fewer bytes than requested
async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> Result<(), FramingError>
where
    R: AsyncReadExt + Unpin,
{
    let mut received = 0;
    while received < buf.len() {
        let rcount = reader.read(&mut buf[received..]).await?;
        if rcount == 0 {
            return Err(FramingError::UnexpectedEof {
                received,
                expected: buf.len(),
            });
        }

        received += rcount;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncWriteExt;

    use super::{read_message, write_message, FramingError};

    #[tokio::test]
    async fn read_framed_payloads() {
        let raw_messages: [&[u8]; 3] = [
            b"\x00\x05hello",
            b"\x00\x1d4,Maria,Lopez,1,1999-01-01,77",
            b"\x00\x00",
        ];
        let expected_payloads = ["hello", "4,Maria,Lopez,1,1999-01-01,77", ""];

        for (raw, expected) in raw_messages.iter().zip(expected_payloads) {
            let payload = read_message(&mut raw.as_ref()).await.unwrap();
            assert_eq!(payload, expected);
        }
    }

    #[tokio::test]
    async fn read_consecutive_frames_from_one_stream() {
        let raw: &[u8] = b"\x00\x03one\x00\x03two";
        let mut reader = raw;

        assert_eq!(read_message(&mut reader).await.unwrap(), "one");
        assert_eq!(read_message(&mut reader).await.unwrap(), "two");
    }

    #[tokio::test]
    async fn a_close_between_frames_is_a_clean_eof() {
        let raw: &[u8] = b"\x00\x03one";
        let mut reader = raw;

        assert_eq!(read_message(&mut reader).await.unwrap(), "one");

        let result = read_message(&mut reader).await;
        assert!(matches!(result, Err(FramingError::Eof)));
    }

    #[tokio::test]
    async fn early_close_is_a_framing_error() {
        // header declares 100 bytes, only 40 arrive before the peer closes
        let mut raw = vec![0x00u8, 100];
        raw.extend_from_slice(&[b'x'; 40]);

        let result = read_message(&mut raw.as_slice()).await;
        assert!(matches!(
            result,
            Err(FramingError::UnexpectedEof {
                received: 40,
                expected: 100,
            })
        ));

        // closing in the middle of the header itself
        let result = read_message(&mut [0x00u8].as_slice()).await;
        assert!(matches!(
            result,
            Err(FramingError::UnexpectedEof {
                received: 1,
                expected: 2,
            })
        ));
    }

    #[tokio::test]
    async fn non_utf8_payload_is_rejected() {
        let raw: &[u8] = b"\x00\x02\xff\xfe";
        let result = read_message(&mut raw.as_ref()).await;
        assert!(matches!(result, Err(FramingError::Utf(_))));
    }

    #[tokio::test]
    async fn write_prefixes_the_payload_length() {
        let mut written = vec![];
        write_message(&mut written, "abc").await.unwrap();
        assert_eq!(written, b"\x00\x03abc");

        let mut written = vec![];
        write_message(&mut written, "").await.unwrap();
        assert_eq!(written, b"\x00\x00");
    }

    #[tokio::test]
    async fn round_trip_through_the_codec() {
        let payloads = ["NOTIFY_BETS_FINISHED 3", "batch processed successfully\n"];

        for payload in payloads {
            let mut written = vec![];
            write_message(&mut written, payload).await.unwrap();
            assert_eq!(read_message(&mut written.as_slice()).await.unwrap(), payload);
        }
    }

    #[tokio::test]
    async fn oversized_payloads_do_not_fit_a_frame() {
        let payload = "x".repeat(u16::MAX as usize + 1);

        let mut written = vec![];
        let result = write_message(&mut written, &payload).await;
        assert!(matches!(result, Err(FramingError::TooLong)));
        assert!(written.is_empty());
    }

    #[tokio::test]
    async fn reassembles_a_frame_that_arrives_in_pieces() {
        // a tiny duplex buffer forces the reader through multiple partial reads
        let (mut tx, mut rx) = tokio::io::duplex(8);

        let writer = tokio::spawn(async move {
            tx.write_all(b"\x00\x40").await.unwrap();
            let payload = b"1,John,Doe,30123456,1990-05-01,7734".repeat(2);
            tx.write_all(&payload[..64]).await.unwrap();
        });

        let payload = read_message(&mut rx).await.unwrap();
        assert_eq!(payload.len(), 64);
        assert!(payload.starts_with("1,John,Doe"));

        writer.await.unwrap();
    }
}
