use clap::{arg,crate_version,Command};
use std::path::Path;
use std::time::Instant;
use deflate::{archive,huffman,lz77_huff,Error};

const RCH: &str = "unreachable was reached";
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let long_help =
"Examples:
---------
Compress:      `deflate big_file.txt -n my_archive`
Expand:        `deflate my_archive.dfa -d`";

    let main_cmd = Command::new("deflate")
        .about("Compress and expand files with a DEFLATE style pipeline")
        .after_long_help(long_help)
        .version(crate_version!())
        .arg(arg!(<path> "path to the file to compress, or to the archive with --decode"))
        .arg(arg!(-d --decode "decode an archive"))
        .arg(arg!(-n --name <NAME> "base name of the output archive, without extension").required(false));

    let matches = main_cmd.get_matches();
    let path = matches.get_one::<String>("path").expect(RCH);
    let result = match matches.get_flag("decode") {
        true => expand_file(path),
        false => compress_file(path,matches.get_one::<String>("name").map(|name| name.as_str()))
    };
    if let Err(e) = result {
        log::error!("{}",e);
        std::process::exit(1);
    }
}

fn compress_file(path: &str,name: Option<&str>) -> STDRESULT {
    let dat = std::fs::read(path)?;
    let timer = Instant::now();
    let archive_bytes = lz77_huff::compress(&dat,path);
    let elapsed = timer.elapsed().as_secs_f64();
    let archive_name = archive::archive_name(name);
    std::fs::write(&archive_name,&archive_bytes)?;
    println!("Compress ratio: {}%",lz77_huff::compress_ratio(dat.len(),archive_bytes.len()));
    println!("Time: {}",elapsed);
    println!("Checksum: {}",hex::encode(huffman::checksum(&dat)));
    println!("Archive successfully created");
    Ok(())
}

fn expand_file(path: &str) -> STDRESULT {
    let archive_path = Path::new(path);
    if !archive::is_archive_path(archive_path) || !archive_path.exists() {
        return Err(Box::new(Error::NotArchive));
    }
    let dat = std::fs::read(archive_path)?;
    let (filename,restored) = lz77_huff::expand(&dat)?;
    // the stored name may carry directories from the compressing side,
    // restore under the bare file name in the working directory
    let out_name = match Path::new(&filename).file_name() {
        Some(name) => name.to_owned(),
        None => return Err(Box::new(Error::BrokenArchive))
    };
    std::fs::write(&out_name,&restored)?;
    println!("Archive successfully decompressed");
    Ok(())
}
