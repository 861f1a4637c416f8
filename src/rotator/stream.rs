use super::byte::Carry;
use super::chunk::rotate_chunk_in_place;
use crate::config::{validate_chunk_size, DEFAULT_CHUNK_SIZE};
use crate::direction::Direction;
use crate::error::{Result, RotateError};
use serde::Serialize;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use tracing::{debug, trace};

/// One chunk of the stream, named by where it starts and how long it is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkWindow {
    pub offset: u64,
    pub len: usize,
}

/// Order in which chunks are visited.
///
/// The first chunk visited is the one that receives the wraparound bit,
/// and each chunk's outgoing carry enters the next chunk visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Start of the stream to the end, used when rotating right
    Forward,
    /// End of the stream to the start, used when rotating left
    Backward,
}

impl Traversal {
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Left => Self::Backward,
            Direction::Right => Self::Forward,
        }
    }

    /// Offset both cursors sit at before the first chunk
    pub fn start(self, len: u64) -> u64 {
        match self {
            Self::Forward => 0,
            Self::Backward => len,
        }
    }

    /// Whether the cursors must be moved before each chunk. Walking forward,
    /// the previous read and write already left them in place.
    fn repositions(self) -> bool {
        matches!(self, Self::Backward)
    }

    /// Lazily produce the chunk windows covering `len` bytes in visiting order
    pub fn windows(self, len: u64, chunk_size: usize) -> ChunkWindows {
        ChunkWindows {
            traversal: self,
            cursor: self.start(len),
            len,
            chunk_size: chunk_size.max(1) as u64,
        }
    }
}

/// Iterator over the chunk windows of a stream.
///
/// Forward windows are `chunk_size` long except the last. Backward windows
/// step down from the end and the window starting at offset 0 is shrunk to
/// the bytes left before the previous window.
#[derive(Debug, Clone)]
pub struct ChunkWindows {
    traversal: Traversal,
    cursor: u64,
    len: u64,
    chunk_size: u64,
}

impl Iterator for ChunkWindows {
    type Item = ChunkWindow;

    fn next(&mut self) -> Option<ChunkWindow> {
        match self.traversal {
            Traversal::Forward => {
                if self.cursor >= self.len {
                    return None;
                }
                let len = (self.len - self.cursor).min(self.chunk_size);
                let window = ChunkWindow {
                    offset: self.cursor,
                    len: len as usize,
                };
                self.cursor += len;
                Some(window)
            }
            Traversal::Backward => {
                if self.cursor == 0 {
                    return None;
                }
                let offset = self.cursor.saturating_sub(self.chunk_size);
                let window = ChunkWindow {
                    offset,
                    len: (self.cursor - offset) as usize,
                };
                self.cursor = offset;
                Some(window)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.traversal {
            Traversal::Forward => self.len.saturating_sub(self.cursor),
            Traversal::Backward => self.cursor,
        };
        let count = remaining.div_ceil(self.chunk_size) as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for ChunkWindows {}

/// What a completed rotation did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RotationStats {
    pub direction: Direction,
    pub chunk_size: usize,
    /// Bytes read from the input and written to the output
    pub bytes: u64,
    /// Chunks processed
    pub chunks: u64,
    /// The bit carried from one end of the stream to the other
    pub wraparound_bit: u8,
}

/// Rotates a whole seekable stream by one bit, one chunk at a time.
#[derive(Debug, Clone, Copy)]
pub struct StreamRotator {
    direction: Direction,
    traversal: Traversal,
    chunk_size: usize,
}

impl StreamRotator {
    /// Create a rotator using the default chunk size
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            traversal: Traversal::for_direction(direction),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the chunk size (at least one byte)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        self.chunk_size = validate_chunk_size(chunk_size)?;
        Ok(self)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Rotate everything in `input` and write it to `output` at the same
    /// offsets.
    ///
    /// The first failing seek, read or write aborts the rotation and is
    /// returned as is. Whatever was already written to `output` stays there.
    pub fn rotate<R, W>(&self, input: &mut R, output: &mut W) -> Result<RotationStats>
    where
        R: Read + Seek,
        W: Write + Seek,
    {
        let len = input.seek(SeekFrom::End(0))?;
        let wraparound = self.wraparound_carry(input, len)?;
        debug!(
            direction = %self.direction,
            len,
            wraparound = wraparound.bit(),
            "computed wraparound carry"
        );

        let start = self.traversal.start(len);
        input.seek(SeekFrom::Start(start))?;
        output.seek(SeekFrom::Start(start))?;

        let buf_len = usize::try_from(len).map_or(self.chunk_size, |len| len.min(self.chunk_size));
        let mut buf = vec![0u8; buf_len];

        // The carry out of the last chunk is the wraparound bit again, already
        // written by the first chunk.
        let (_, chunks) = self.traversal.windows(len, self.chunk_size).try_fold(
            (wraparound, 0u64),
            |(carry, chunks), window| -> Result<(Carry, u64)> {
                let carry = self.rotate_window(input, output, window, &mut buf, carry)?;
                Ok((carry, chunks + 1))
            },
        )?;
        output.flush()?;

        Ok(RotationStats {
            direction: self.direction(),
            chunk_size: self.chunk_size(),
            bytes: len,
            chunks,
            wraparound_bit: wraparound.bit(),
        })
    }

    /// Read the bit that travels from one end of the stream to the other:
    /// the top bit of the first byte rotating left, the bottom bit of the
    /// last byte rotating right.
    fn wraparound_carry<R: Read + Seek>(&self, input: &mut R, len: u64) -> Result<Carry> {
        if len == 0 {
            return Err(RotateError::EmptyInput);
        }
        let offset = match self.direction {
            Direction::Left => 0,
            Direction::Right => len - 1,
        };
        input.seek(SeekFrom::Start(offset))?;
        let mut byte = [0u8; 1];
        input.read_exact(&mut byte)?;
        Ok(Carry::leaving(byte[0], self.direction))
    }

    fn rotate_window<R, W>(
        &self,
        input: &mut R,
        output: &mut W,
        window: ChunkWindow,
        buf: &mut [u8],
        carry: Carry,
    ) -> Result<Carry>
    where
        R: Read + Seek,
        W: Write + Seek,
    {
        if self.traversal.repositions() {
            input.seek(SeekFrom::Start(window.offset))?;
            output.seek(SeekFrom::Start(window.offset))?;
        }

        let chunk = &mut buf[..window.len];
        input.read_exact(chunk)?;
        let carry_out = rotate_chunk_in_place(chunk, carry, self.direction);
        output.write_all(chunk)?;

        trace!(
            offset = window.offset,
            len = window.len,
            carry_in = carry.bit(),
            carry_out = carry_out.bit(),
            "rotated chunk"
        );
        Ok(carry_out)
    }
}

/// Rotate an in-memory buffer with the same chunked traversal used for files
pub fn rotate_bytes(data: &[u8], direction: Direction) -> Result<Vec<u8>> {
    let mut output = Cursor::new(Vec::with_capacity(data.len()));
    StreamRotator::new(direction).rotate(&mut Cursor::new(data), &mut output)?;
    Ok(output.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use Direction::{Left, Right};

    fn rotate_with(input: &[u8], direction: Direction, chunk_size: usize) -> Result<Vec<u8>> {
        let rotator = StreamRotator::new(direction).with_chunk_size(chunk_size)?;
        let mut output = Cursor::new(Vec::new());
        rotator.rotate(&mut Cursor::new(input), &mut output)?;
        Ok(output.into_inner())
    }

    fn windows(traversal: Traversal, len: u64, chunk_size: usize) -> Vec<(u64, usize)> {
        traversal
            .windows(len, chunk_size)
            .map(|w| (w.offset, w.len))
            .collect()
    }

    #[test]
    fn test_rotate_stream_cases() {
        let cases: Vec<(&str, Vec<u8>, Direction, Vec<u8>)> = vec![
            ("all ones, right", vec![255, 255, 255], Right, vec![255, 255, 255]),
            ("all ones, left", vec![255, 255, 255], Left, vec![255, 255, 255]),
            ("all zeroes, right", vec![0; 6], Right, vec![0; 6]),
            ("all zeroes, left", vec![0; 5], Left, vec![0; 5]),
            (
                "255 in the middle, right",
                vec![0, 0, 255, 0, 0],
                Right,
                vec![0, 0, 0b0111_1111, 0b1000_0000, 0],
            ),
            (
                "255 in the middle, left",
                vec![0, 0, 255, 0, 0],
                Left,
                vec![0, 0b0000_0001, 0b1111_1110, 0, 0],
            ),
            (
                "two 255s at the start, left",
                vec![255, 255, 0],
                Left,
                vec![255, 0b1111_1110, 0b0000_0001],
            ),
            (
                "two 255s at the end, right",
                vec![0, 255, 255],
                Right,
                vec![0b1000_0000, 0b0111_1111, 255],
            ),
            (
                "two 255s at the end, left",
                vec![0, 255, 255],
                Left,
                vec![0b0000_0001, 255, 0b1111_1110],
            ),
            (
                "two 255s at the start, right",
                vec![255, 255, 0],
                Right,
                vec![0b0111_1111, 255, 0b1000_0000],
            ),
            ("single byte, left", vec![0b1000_0001], Left, vec![0b0000_0011]),
            ("single byte, right", vec![0b1000_0001], Right, vec![0b1100_0000]),
        ];

        for (name, input, direction, want) in cases {
            for chunk_size in [1, 2, 3, 1024] {
                let got = rotate_with(&input, direction, chunk_size).unwrap();
                assert_eq!(got, want, "{} (chunk size {})", name, chunk_size);
            }
        }
    }

    #[test]
    fn test_empty_input_fails() {
        for direction in [Left, Right] {
            let err = rotate_with(&[], direction, 2).unwrap_err();
            assert!(matches!(err, RotateError::EmptyInput));
        }
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let err = StreamRotator::new(Left).with_chunk_size(0).unwrap_err();
        assert!(matches!(err, RotateError::InvalidChunkSize(0)));
    }

    #[test]
    fn test_forward_windows_short_last_chunk() {
        assert_eq!(
            windows(Traversal::Forward, 5, 2),
            vec![(0, 2), (2, 2), (4, 1)]
        );
        assert_eq!(windows(Traversal::Forward, 4, 2), vec![(0, 2), (2, 2)]);
        assert_eq!(windows(Traversal::Forward, 3, 1024), vec![(0, 3)]);
    }

    #[test]
    fn test_backward_windows_shrink_at_start() {
        assert_eq!(
            windows(Traversal::Backward, 5, 2),
            vec![(3, 2), (1, 2), (0, 1)]
        );
        assert_eq!(windows(Traversal::Backward, 4, 2), vec![(2, 2), (0, 2)]);
        assert_eq!(windows(Traversal::Backward, 3, 1024), vec![(0, 3)]);
    }

    #[test]
    fn test_windows_of_empty_stream() {
        assert!(windows(Traversal::Forward, 0, 4).is_empty());
        assert!(windows(Traversal::Backward, 0, 4).is_empty());
    }

    #[test]
    fn test_windows_exact_size() {
        for traversal in [Traversal::Forward, Traversal::Backward] {
            for len in 0..20u64 {
                for chunk in 1..7 {
                    let iter = traversal.windows(len, chunk);
                    let hinted = iter.len();
                    let all: Vec<_> = iter.collect();
                    assert_eq!(all.len(), hinted);
                    assert_eq!(all.iter().map(|w| w.len as u64).sum::<u64>(), len);
                }
            }
        }
    }

    #[test]
    fn test_stats() {
        let rotator = StreamRotator::new(Left).with_chunk_size(2).unwrap();
        let mut output = Cursor::new(Vec::new());
        let stats = rotator
            .rotate(&mut Cursor::new(vec![0x80, 0, 0, 0, 0]), &mut output)
            .unwrap();
        assert_eq!(
            stats,
            RotationStats {
                direction: Left,
                chunk_size: 2,
                bytes: 5,
                chunks: 3,
                wraparound_bit: 1,
            }
        );
        assert_eq!(output.into_inner(), vec![0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_short_final_chunk_matches_single_pass() {
        let input = vec![0b1010_0101, 0x3C, 0xF0, 0x0F, 0x81];
        for direction in [Left, Right] {
            let chunked = rotate_with(&input, direction, 2).unwrap();
            let single = rotate_with(&input, direction, input.len()).unwrap();
            assert_eq!(chunked, single);
        }
    }

    #[test]
    fn test_rotate_bytes_there_and_back() {
        let input: Vec<u8> = (0..3000u32).map(|i| (i * 31 % 251) as u8).collect();
        for direction in [Left, Right] {
            let there = rotate_bytes(&input, direction).unwrap();
            assert_ne!(there, input);
            let back = rotate_bytes(&there, direction.opposite()).unwrap();
            assert_eq!(back, input);
        }
    }

    #[test]
    fn test_output_overwrites_from_offset_zero() {
        let rotator = StreamRotator::new(Right).with_chunk_size(2).unwrap();
        let mut output = Cursor::new(vec![0xAA; 3]);
        output.set_position(3);
        rotator
            .rotate(&mut Cursor::new(vec![1, 0, 0]), &mut output)
            .unwrap();
        assert_eq!(output.into_inner(), vec![0, 0b1000_0000, 0]);
    }

    /// Input whose reads fail once `allowed` bytes have been handed out
    struct FailingReader {
        inner: Cursor<Vec<u8>>,
        allowed: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.allowed == 0 {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read refused"));
            }
            let want = buf.len().min(self.allowed);
            let n = self.inner.read(&mut buf[..want])?;
            self.allowed -= n;
            Ok(n)
        }
    }

    impl Seek for FailingReader {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_read_failure_aborts_with_partial_output() {
        // One byte for the wraparound read, then one full chunk
        let mut input = FailingReader {
            inner: Cursor::new(vec![0xFF; 6]),
            allowed: 3,
        };
        let rotator = StreamRotator::new(Right).with_chunk_size(2).unwrap();
        let mut output = Cursor::new(Vec::new());
        let err = rotator.rotate(&mut input, &mut output).unwrap_err();
        match err {
            RotateError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::PermissionDenied);
                assert_eq!(e.to_string(), "read refused");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(output.into_inner(), vec![0xFF, 0xFF]);
    }

    #[test]
    fn test_accessors_report_configuration() {
        let rotator = StreamRotator::new(Left);
        assert_eq!(rotator.direction(), Left);
        assert_eq!(rotator.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(rotator.with_chunk_size(7).unwrap().chunk_size(), 7);
    }

    /// Output that refuses every write after the first `allowed`
    struct FailingWriter {
        inner: Cursor<Vec<u8>>,
        allowed: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.allowed == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.allowed -= 1;
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for FailingWriter {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_write_failure_aborts_with_partial_output() {
        let rotator = StreamRotator::new(Right).with_chunk_size(2).unwrap();
        let mut output = FailingWriter {
            inner: Cursor::new(Vec::new()),
            allowed: 1,
        };
        let err = rotator
            .rotate(&mut Cursor::new(vec![0xFF; 6]), &mut output)
            .unwrap_err();
        match err {
            RotateError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::Other);
                assert_eq!(e.to_string(), "disk full");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // The first chunk stays written
        assert_eq!(output.inner.into_inner(), vec![0xFF, 0xFF]);
    }

    /// Input that claims to be longer than it is
    struct TruncatedReader {
        inner: Cursor<Vec<u8>>,
        missing: u64,
    }

    impl Read for TruncatedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Seek for TruncatedReader {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            match pos {
                SeekFrom::End(0) => {
                    let end = self.inner.seek(SeekFrom::End(0))?;
                    Ok(end + self.missing)
                }
                other => self.inner.seek(other),
            }
        }
    }

    #[test]
    fn test_input_ending_early_is_an_error() {
        let mut input = TruncatedReader {
            inner: Cursor::new(vec![1, 2, 3, 4]),
            missing: 2,
        };
        let rotator = StreamRotator::new(Right).with_chunk_size(2).unwrap();
        let err = rotator
            .rotate(&mut input, &mut Cursor::new(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, RotateError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    /// Input that cannot be positioned
    struct Unseekable;

    impl Read for Unseekable {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Seek for Unseekable {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "not seekable"))
        }
    }

    #[test]
    fn test_seek_failure_propagates() {
        let err = StreamRotator::new(Left)
            .rotate(&mut Unseekable, &mut Cursor::new(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, RotateError::Io(ref e) if e.kind() == io::ErrorKind::Unsupported));
    }
}
