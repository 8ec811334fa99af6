use clap::{
    Arg, ColorChoice, Command,
    builder::ValueParser,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub fn validator_key_value() -> ValueParser {
    ValueParser::from(move |s: &str| -> std::result::Result<String, String> {
        for pair in s.split(';') {
            match pair.split_once('=') {
                Some((k, _)) if !k.trim().is_empty() => (),
                _ => return Err(String::from("metadata format is key1=value1;key2=value2")),
            }
        }
        Ok(s.to_string())
    })
}

pub fn validator_is_num() -> ValueParser {
    ValueParser::from(move |s: &str| -> std::result::Result<usize, String> {
        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(String::from("Not a valid number")),
        }
    })
}

pub fn validator_is_file() -> ValueParser {
    ValueParser::from(move |s: &str| -> std::result::Result<PathBuf, String> {
        if let Ok(metadata) = fs::metadata(s)
            && metadata.is_file()
        {
            return Ok(PathBuf::from(s));
        }

        Err(format!("Invalid file path or file does not exist: '{s}'"))
    })
}

pub fn new(config_path: &Path) -> Command {
    // get config file path (default: ~/.config/s3chan/config.yml)
    let config_file_path = config_path.join("config.yml");

    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("s3chan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Streaming multipart uploads to S3 compatible storage")
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("checksum")
            .help("Integrity checksum sent with every part")
            .long("checksum")
            .default_value("md5")
            .value_parser([
                "md5",
                "crc32",
                "crc32c",
                "sha1",
                "sha256",
            ])
            .value_name("algorithm")
            .num_args(1)
        )
        .arg(
            Arg::new("quiet")
            .long("quiet")
            .short('q')
            .help("Don't show progress bar")
            .num_args(0)
        )
        .arg(
            Arg::new("meta")
            .long("meta")
            .short('m')
            .help("User-defined object metadata \"x-amz-meta-*\", example: \"key1=value1;key2=value2\"")
            .value_parser(validator_key_value())
            .num_args(1)
        )
        .arg(
            Arg::new("content-type")
            .long("content-type")
            .help("Content-Type of the object")
            .value_name("mime")
            .num_args(1)
        )
        .arg(
            Arg::new("pipe")
            .long("pipe")
            .short('p')
            .help("Read from STDIN")
            .num_args(0)
        )
        .arg(
            Arg::new("buffer")
            .default_value("10485760")
            .help("Buffer \"part size\" in bytes")
            .long("buffer")
            .short('b')
            .num_args(1)
            .value_parser(validator_is_num())
        )
        .arg(
            Arg::new("config")
            .default_value(config_file_path.into_os_string())
            .long("config")
            .num_args(1)
            .short('c')
            .value_parser(validator_is_file())
            .value_name("config.yml")
        )
        .arg(
            Arg::new("arguments")
            .help("/path/to/file <s3 provider>/<bucket>/<key>")
            .required(true)
            .num_args(1..=2)
        )
        .arg(
            Arg::new("verbose")
            .help("Verbosity level")
            .short('v')
            .long("verbose")
            .global(true)
            .action(clap::ArgAction::Count)
        )
        .arg(
            Arg::new("retries")
            .help("Attempts per part")
            .long("retries")
            .short('r')
            .default_value("3")
            .value_parser(clap::value_parser!(u8).range(1..=10))
            .num_args(1)
        )
        .arg(
            Arg::new("abort-on-failure")
            .help("Discard the stored parts when the upload fails")
            .long("abort-on-failure")
            .num_args(0)
        )
}
