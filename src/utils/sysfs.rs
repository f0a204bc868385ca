use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a short text value from a sysfs or devicetree file.
///
/// Devicetree strings are NUL-terminated, so trailing `\0` bytes are stripped
/// along with trailing whitespace.
pub fn read_line(file: &Path, capacity: usize) -> Option<String> {
    let mut reader = String::with_capacity(capacity);
    let mut f = File::open(file).ok()?;
    f.read_to_string(&mut reader).ok()?;
    let trimmed = reader.trim_end_matches(['\0', '\n', '\r', ' ', '\t']);
    reader.truncate(trimmed.len());
    Some(reader)
}

/// Designed at first for reading an `i32` or `u32` aka `c_long`
/// from a sysfs file such as `cur_freq` or `temp`.
pub fn read_number<N>(file: &Path) -> Option<N>
where
    N: std::str::FromStr,
{
    let mut reader = [0u8; 32];
    let mut f = File::open(file).ok()?;
    let n = f.read(&mut reader).ok()?;
    // parse and trim would complain about `\0`.
    let number = &reader[..n];
    let number = std::str::from_utf8(number).ok()?;
    number.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_line_strips_nul_and_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model");
        fs::write(&path, b"NVIDIA Orin Nano Developer Kit\0").unwrap();
        assert_eq!(
            read_line(&path, 32).unwrap(),
            "NVIDIA Orin Nano Developer Kit"
        );

        let path = dir.path().join("name");
        fs::write(&path, "pwm-fan\n").unwrap();
        assert_eq!(read_line(&path, 16).unwrap(), "pwm-fan");
    }

    #[test]
    fn test_read_number() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cur_freq");
        fs::write(&path, "612000000\n").unwrap();
        assert_eq!(read_number::<u64>(&path), Some(612000000));
        assert_eq!(read_number::<u64>(&dir.path().join("missing")), None);
    }
}
