//! LZ77 compression with static Huffman encoding
//!
//! The two stage pipeline behind `.dfa` archives.  The LZ77 stage replaces
//! repeated runs with codewords over a 256 byte sliding window, the codewords
//! are serialized three bytes apiece, and the Huffman stage entropy codes that
//! intermediate stream.  The archive frames the original file name, an MD5
//! checksum of the uncompressed bytes, the code table, and the packed bit
//! stream.
//!
//! * This transforms buffers, not files (we expect files that are easily buffered)
//! * Expansion verifies the stored checksum and is the exact inverse of compression

use crate::archive::Archive;
use crate::huffman;
use crate::lz77::{self,LZ77Codec};
use crate::Error;

/// Size of the LZ77 sliding window.  The wire format stores offsets and
/// lengths in one byte each, which fixes the window.
pub const WINDOW_SIZE: usize = 256;

/// Main compression function, returns the framed archive.
pub fn compress(data: &[u8],filename: &str) -> Vec<u8> {
    let codec = LZ77Codec::create(WINDOW_SIZE);
    let codewords = codec.encode(data);
    log::debug!("LZ77 stage: {} codewords for {} bytes",codewords.len(),data.len());
    let intermediate = lz77::pack_codewords(&codewords);
    let (bits,table) = huffman::encode(&intermediate);
    log::debug!("Huffman stage: {} bits",bits.len());
    let archive = Archive {
        filename: filename.to_string(),
        checksum: huffman::checksum(data),
        table,
        bit_len: bits.len() as u32,
        payload: bits.to_bytes()
    };
    archive.pack()
}

/// Main expansion function, returns the stored file name and the restored bytes.
pub fn expand(data: &[u8]) -> Result<(String,Vec<u8>),Error> {
    let archive = Archive::unpack(data)?;
    let intermediate = huffman::decode(&archive.table,&archive.payload,archive.bit_len as usize)?;
    let codewords = lz77::unpack_codewords(&intermediate)?;
    let restored = LZ77Codec::create(WINDOW_SIZE).decode(&codewords)?;
    if huffman::checksum(&restored) != archive.checksum {
        return Err(Error::WrongChecksum);
    }
    log::debug!("restored {} bytes for {}",restored.len(),archive.filename);
    Ok((archive.filename,restored))
}

/// Compress ratio in percent, negative when the archive outgrew the input.
pub fn compress_ratio(original_size: usize,compressed_size: usize) -> f64 {
    (1.0 - compressed_size as f64 / original_size as f64) * 100.0
}

// *************** TESTS *****************

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let archive = compress(test_data,"sam.txt");
    let (filename,restored) = expand(&archive).expect("expansion failed");
    assert_eq!(filename,"sam.txt");
    assert_eq!(restored,test_data.to_vec());
}

#[test]
fn invertibility_random() {
    // a deterministic pseudo random kilobyte
    let mut state: u32 = 0x2F6E2B1;
    let test_data: Vec<u8> = (0..1024).map(|_i| {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        (state >> 24) as u8
    }).collect();
    let archive = compress(&test_data,"noise.bin");
    let (filename,restored) = expand(&archive).expect("expansion failed");
    assert_eq!(filename,"noise.bin");
    assert_eq!(restored,test_data);
}

#[test]
fn invertibility_long_repeats() {
    // long periodic runs force split codewords through the whole pipeline
    let test_data = "ab".repeat(400);
    let archive = compress(test_data.as_bytes(),"runs.txt");
    let (_filename,restored) = expand(&archive).expect("expansion failed");
    assert_eq!(restored,test_data.as_bytes().to_vec());
}

#[test]
fn invertibility_empty() {
    let archive = compress(b"","empty.txt");
    let (filename,restored) = expand(&archive).expect("expansion failed");
    assert_eq!(filename,"empty.txt");
    assert_eq!(restored,Vec::<u8>::new());
    // the stored checksum is the digest of the empty string
    let unpacked = Archive::unpack(&archive).expect("unpacking failed");
    assert_eq!(hex::encode(unpacked.checksum),"d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(unpacked.bit_len,0);
    assert_eq!(unpacked.payload,Vec::<u8>::new());
}

#[test]
fn tampered_checksums_are_detected() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let mut archive = compress(test_data,"sam.txt");
    // the checksum field sits just behind the file name
    let index = 2 + "sam.txt".len() + 3;
    archive[index] ^= 0x40;
    assert_eq!(expand(&archive),Err(Error::WrongChecksum));
}

#[test]
fn tampered_tables_are_detected() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let archive = compress(test_data,"sam.txt");
    let unpacked = Archive::unpack(&archive).expect("unpacking failed");
    let table_start = 2 + "sam.txt".len() + 16 + 4;
    let table_end = archive.len() - 4 - unpacked.payload.len();
    for index in table_start..table_end {
        let mut tampered = archive.clone();
        tampered[index] ^= 0x40;
        assert_eq!(expand(&tampered),Err(Error::BrokenArchive),"table byte {}",index);
    }
}

#[test]
fn tampered_payloads_are_detected() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let archive = compress(test_data,"sam.txt");
    // flipping the leading payload bit rewrites the first codeword
    let payload_len = Archive::unpack(&archive).expect("unpacking failed").payload.len();
    let mut tampered = archive.clone();
    let first_payload = tampered.len() - payload_len;
    tampered[first_payload] ^= 0x80;
    assert!(expand(&tampered).is_err());
    // a payload cut short leaves the stored bit count unsatisfiable
    let truncated = &archive[..archive.len() - 1];
    assert_eq!(expand(truncated),Err(Error::BrokenArchive));
}
