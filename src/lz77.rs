//! LZ77 sliding window stage
//!
//! The encoder walks the input looking for the longest earlier occurrence of the
//! bytes at the cursor, and emits `(offset,length,literal)` codewords.  Archives
//! always use a 256 byte window so that both wire fields fit in one byte, but the
//! codec takes the window explicitly, which also gives the tests smaller windows
//! to exercise exact codeword sequences.
//!
//! Matches longer than the window are split into several codewords.  Every split
//! codeword covers exactly one window of output (`window - 1` copied bytes plus
//! its literal), keeping the replay byte-exact no matter how long the run.

use crate::Error;

/// Codeword for the LZ77 stage.  Directs the decoder to copy `length` bytes
/// starting `offset` positions behind the output cursor, then append `literal`.
/// `offset == 0` means there is no back reference.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct Codeword {
    pub offset: u8,
    pub length: u8,
    pub literal: u8
}

impl Codeword {
    pub fn new(offset: u8,length: u8,literal: u8) -> Self {
        Self { offset, length, literal }
    }
}

/// Structure to perform the LZ77 stage of compression.
pub struct LZ77Codec {
    window_length: usize
}

impl LZ77Codec {
    pub fn create(window_length: usize) -> Self {
        Self { window_length }
    }
    /// Encode `data` as a codeword sequence.
    pub fn encode(&self,data: &[u8]) -> Vec<Codeword> {
        let mut codewords = Vec::new();
        let mut position: usize = 0;
        while position < data.len() {
            let (offset,mut length) = self.longest_match(data,position);
            let literal = data[position + length];
            // start of the output bytes the next emitted codeword covers
            let mut emitted = position;
            position += length + 1;
            while length >= self.window_length {
                codewords.push(Codeword::new(
                    offset as u8,
                    (self.window_length - 1) as u8,
                    data[emitted + self.window_length - 1]
                ));
                emitted += self.window_length;
                length -= self.window_length;
            }
            codewords.push(Codeword::new(offset as u8,length as u8,literal));
        }
        codewords
    }
    /// Find the longest match behind `position`, searching from the nearest
    /// offset outward and replacing only on strict improvement, so the most
    /// recent occurrence wins ties.  Returns `(offset,length)`, zeros when
    /// nothing matched.
    fn longest_match(&self,data: &[u8],position: usize) -> (usize,usize) {
        let mut best_offset: usize = 0;
        let mut best_length: usize = 0;
        let mut offset: usize = 1;
        while offset < self.window_length && offset <= position {
            let length = match_length(data,position - offset,position);
            if length > best_length {
                best_length = length;
                best_offset = offset;
            }
            offset += 1;
        }
        (best_offset,best_length)
    }
    /// Replay a codeword sequence into the original bytes.
    pub fn decode(&self,codewords: &[Codeword]) -> Result<Vec<u8>,Error> {
        let mut buffer: Vec<u8> = Vec::new();
        for codeword in codewords {
            let offset = codeword.offset as usize;
            if offset > buffer.len() {
                return Err(Error::OutOfWindow);
            }
            if offset > 0 {
                // one byte at a time so an overlapping run reads its own output
                let mut source = buffer.len() - offset;
                for _i in 0..codeword.length {
                    buffer.push(buffer[source]);
                    source += 1;
                }
            }
            buffer.push(codeword.literal);
        }
        Ok(buffer)
    }
}

/// Count matching bytes between the pattern and the cursor.  The bound keeps the
/// last byte of the buffer out of every match, it must remain available as the
/// literal of the final codeword.
fn match_length(data: &[u8],pattern_position: usize,matching_position: usize) -> usize {
    let mut length: usize = 0;
    while matching_position + length + 1 < data.len()
        && data[pattern_position + length] == data[matching_position + length] {
        length += 1;
    }
    length
}

/// Serialize codewords three bytes apiece, the intermediate stream handed to the
/// Huffman stage.
pub fn pack_codewords(codewords: &[Codeword]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(3 * codewords.len());
    for codeword in codewords {
        bytes.push(codeword.offset);
        bytes.push(codeword.length);
        bytes.push(codeword.literal);
    }
    bytes
}

/// Inverse of `pack_codewords`.
pub fn unpack_codewords(data: &[u8]) -> Result<Vec<Codeword>,Error> {
    if data.len() % 3 != 0 {
        return Err(Error::BrokenArchive);
    }
    let mut codewords = Vec::with_capacity(data.len() / 3);
    for chunk in data.chunks_exact(3) {
        codewords.push(Codeword::new(chunk[0],chunk[1],chunk[2]));
    }
    Ok(codewords)
}

// *************** TESTS *****************

#[test]
fn encoding_works() {
    let test_data = "ababababababab".as_bytes();
    let codec = LZ77Codec::create(test_data.len());
    let codewords = codec.encode(test_data);
    assert_eq!(codewords,vec![
        Codeword::new(0,0,97),
        Codeword::new(0,0,98),
        Codeword::new(2,11,98)
    ]);
}

#[test]
fn encoding_works_large() {
    let test_data = "ababababababab".repeat(10);
    let codec = LZ77Codec::create(test_data.len());
    let codewords = codec.encode(test_data.as_bytes());
    assert_eq!(codewords,vec![
        Codeword::new(0,0,97),
        Codeword::new(0,0,98),
        Codeword::new(2,137,98)
    ]);
    // the full 256 byte window sees the same sequence
    let codec = LZ77Codec::create(256);
    let codewords = codec.encode(test_data.as_bytes());
    assert_eq!(codewords,vec![
        Codeword::new(0,0,97),
        Codeword::new(0,0,98),
        Codeword::new(2,137,98)
    ]);
}

#[test]
fn long_matches_split() {
    let test_data = "ab".repeat(300);
    let codec = LZ77Codec::create(256);
    let codewords = codec.encode(test_data.as_bytes());
    assert!(codewords.iter().any(|c| c.offset == 2 && c.length == 255));
    let decoded = codec.decode(&codewords).expect("decoding failed");
    assert_eq!(decoded,test_data.as_bytes());
}

#[test]
fn decoding_works() {
    let codewords = vec![
        Codeword::new(0,0,97),
        Codeword::new(0,0,98),
        Codeword::new(2,11,98)
    ];
    let codec = LZ77Codec::create(256);
    let decoded = codec.decode(&codewords).expect("decoding failed");
    assert_eq!(decoded,"ababababababab".as_bytes());
}

#[test]
fn single_byte_and_empty() {
    let codec = LZ77Codec::create(256);
    assert_eq!(codec.encode(&[]),vec![]);
    assert_eq!(codec.encode(&[7]),vec![Codeword::new(0,0,7)]);
    assert_eq!(codec.decode(&[]).expect("decoding failed"),Vec::<u8>::new());
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let codec = LZ77Codec::create(256);
    let codewords = codec.encode(test_data);
    let decoded = codec.decode(&codewords).expect("decoding failed");
    assert_eq!(decoded,test_data);
}

#[test]
fn offsets_beyond_output_are_rejected() {
    let codec = LZ77Codec::create(256);
    let codewords = vec![Codeword::new(5,0,97)];
    assert_eq!(codec.decode(&codewords),Err(Error::OutOfWindow));
}

#[test]
fn packing_round_trip() {
    let codewords = vec![
        Codeword::new(0,0,97),
        Codeword::new(2,11,98)
    ];
    let bytes = pack_codewords(&codewords);
    assert_eq!(bytes,vec![0,0,97,2,11,98]);
    assert_eq!(unpack_codewords(&bytes).expect("unpacking failed"),codewords);
}

#[test]
fn ragged_streams_are_rejected() {
    assert_eq!(unpack_codewords(&[0,0,97,2]),Err(Error::BrokenArchive));
}
