use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

#[test]
fn round_trip() -> STDRESULT {
    let work_dir = tempfile::tempdir()?;
    let restore_dir = tempfile::tempdir()?;
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".repeat(40);
    std::fs::write(work_dir.path().join("sam.txt"),&test_data)?;

    let mut cmd = Command::cargo_bin("deflate")?;
    cmd.current_dir(&work_dir)
        .arg("sam.txt")
        .arg("-n").arg("sam")
        .assert()
        .success()
        .stdout(predicate::str::contains("Compress ratio: "))
        .stdout(predicate::str::contains("Checksum: "))
        .stdout(predicate::str::contains("Archive successfully created"));

    let archive_path = work_dir.path().join("sam.dfa");
    let mut cmd = Command::cargo_bin("deflate")?;
    cmd.current_dir(&restore_dir)
        .arg(&archive_path)
        .arg("-d")
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive successfully decompressed"));

    let restored = std::fs::read(restore_dir.path().join("sam.txt"))?;
    assert_eq!(restored,test_data.as_bytes());
    Ok(())
}

#[test]
fn default_archive_name() -> STDRESULT {
    let work_dir = tempfile::tempdir()?;
    std::fs::write(work_dir.path().join("sam.txt"),"I am Sam.\n")?;

    let mut cmd = Command::cargo_bin("deflate")?;
    cmd.current_dir(&work_dir)
        .arg("sam.txt")
        .assert()
        .success();

    let mut archives = Vec::new();
    for entry in std::fs::read_dir(&work_dir)? {
        let name = entry?.file_name().to_string_lossy().to_string();
        if name.ends_with(".dfa") {
            archives.push(name);
        }
    }
    assert_eq!(archives.len(),1);
    assert!(archives[0].starts_with("archived by deflate at "));
    Ok(())
}

#[test]
fn rejects_non_archives() -> STDRESULT {
    let work_dir = tempfile::tempdir()?;
    std::fs::write(work_dir.path().join("sam.txt"),"not an archive")?;

    let mut cmd = Command::cargo_bin("deflate")?;
    cmd.current_dir(&work_dir)
        .arg("sam.txt")
        .arg("-d")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not .dfa"));
    Ok(())
}

#[test]
fn rejects_missing_archives() -> STDRESULT {
    let work_dir = tempfile::tempdir()?;

    let mut cmd = Command::cargo_bin("deflate")?;
    cmd.current_dir(&work_dir)
        .arg("missing.dfa")
        .arg("-d")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not .dfa"));
    Ok(())
}

#[test]
fn rejects_tampered_archives() -> STDRESULT {
    let work_dir = tempfile::tempdir()?;
    std::fs::write(work_dir.path().join("sam.txt"),"I am Sam. Sam I am.\n")?;

    let mut cmd = Command::cargo_bin("deflate")?;
    cmd.current_dir(&work_dir)
        .arg("sam.txt")
        .arg("-n").arg("sam")
        .assert()
        .success();

    // flip a byte inside the stored checksum
    let archive_path = work_dir.path().join("sam.dfa");
    let mut archive = std::fs::read(&archive_path)?;
    let index = 2 + "sam.txt".len() + 3;
    archive[index] ^= 0x40;
    std::fs::write(&archive_path,&archive)?;

    let mut cmd = Command::cargo_bin("deflate")?;
    cmd.current_dir(&work_dir)
        .arg("sam.dfa")
        .arg("-d")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("wrong checksum"));
    Ok(())
}
