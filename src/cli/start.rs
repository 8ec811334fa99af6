use crate::{
    channel::{ChecksumAlgorithm, ObjectMetadata},
    cli::{
        Config, Host, S3Location, commands,
        upload::{Source, Upload},
    },
    s3::{Credentials, S3, limits::MIN_PART_SIZE_BYTES},
};
use anyhow::{Context, Result, anyhow};
use bytesize::ByteSize;
use clap::ArgMatches;
use colored::Colorize;
use secrecy::SecretString;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// # Errors
///
/// Will return `Err` if the config directory can not be created
pub fn get_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().map_or_else(|| PathBuf::from("/tmp"), |h| h);

    let config_path = Path::new(&home_dir).join(".config").join("s3chan");
    fs::create_dir_all(&config_path)
        .context(format!("unable to create: {}", &config_path.display()))?;

    Ok(config_path)
}

/// Parses the command line, initializes the logger and prepares the upload
///
/// # Errors
///
/// Will return `Err` if the config file or the arguments are not valid
pub fn start() -> Result<(S3, Upload)> {
    let config_path = get_config_path()?;

    // start the command line interface
    let cmd = commands::new(&config_path);

    // get the matches
    let matches = cmd.get_matches();

    let verbosity_level = match matches.get_one::<u8>("verbose").copied().unwrap_or(0) {
        0 => log::LevelFilter::Off,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(verbosity_level)
        .init();

    log::info!("config path: {}", config_path.display());

    setup(&matches)
}

fn setup(matches: &ArgMatches) -> Result<(S3, Upload)> {
    // Config file is required
    let config_file = matches
        .get_one::<PathBuf>("config")
        .context("no config file found")?;

    // load the config file
    let config = Config::new(config_file)?;

    let args: Vec<&str> = matches
        .get_many::<String>("arguments")
        .unwrap_or_default()
        .map(String::as_str)
        .collect();

    let pipe = matches.get_one::<bool>("pipe").copied().unwrap_or(false);

    let (source, location) = match (args.as_slice(), pipe) {
        // s3chan --pipe host/bucket/key
        ([location], true) => (Source::Stdin, *location),
        // s3chan /path/to/file host/bucket/key
        ([file, location], false) => (Source::File(PathBuf::from(file)), *location),
        _ => {
            return Err(anyhow!(
                "Invalid arguments. Expected format: '/path/to/file <s3 provider>/<bucket>/<key>' or use --pipe for standard input"
            ));
        }
    };

    let location = S3Location::parse(location)?;

    log::info!("location: {location:?}");

    // HOST: get it from the config file
    let host = get_host(&config, config_file, &location.host)?;

    // REGION
    let region = host.get_region()?;

    // AUTH
    let credentials = Credentials::new(
        &host.access_key,
        &SecretString::new(host.secret_key.clone().into()),
    );

    let s3 = S3::new(&credentials, &region);

    log::debug!("S3:\n{s3}");

    let key = object_key(location.key, &source)?;

    // define part size
    let part_size = matches
        .get_one::<usize>("buffer")
        .copied()
        .unwrap_or(10_485_760);

    let part_bytes = ByteSize::b(u64::try_from(part_size)?);

    if part_bytes.as_u64() < MIN_PART_SIZE_BYTES {
        log::warn!(
            "part size {part_bytes} is below {}, AWS S3 rejects such parts unless the object fits in one part",
            ByteSize::b(MIN_PART_SIZE_BYTES)
        );
    }

    log::info!("part size: {part_bytes}");

    let checksum = matches
        .get_one::<String>("checksum")
        .map_or(Ok(ChecksumAlgorithm::default()), |c| {
            c.parse::<ChecksumAlgorithm>().map_err(|e| anyhow!(e))
        })?;

    let mut meta = matches
        .get_one::<String>("meta")
        .map_or_else(ObjectMetadata::default, |m| parse_meta(m));

    if let Some(content_type) = matches.get_one::<String>("content-type") {
        meta = meta.with_content_type(content_type);
    }

    let upload = Upload {
        source,
        bucket: location.bucket,
        key,
        meta,
        part_size,
        checksum,
        retries: matches.get_one::<u8>("retries").copied().unwrap_or(3),
        abort_on_failure: matches
            .get_one::<bool>("abort-on-failure")
            .copied()
            .unwrap_or(false),
        quiet: matches.get_one::<bool>("quiet").copied().unwrap_or(false),
    };

    log::debug!("upload: {upload:#?}");

    Ok((s3, upload))
}

fn get_host<'a>(config: &'a Config, config_file: &Path, name: &str) -> Result<&'a Host> {
    config.get_host(name).map_err(|_| {
        anyhow!(
            "Could not find host: \"{}\". Check config file {}, For more information try {}",
            name.red(),
            config_file.display(),
            "--help".green()
        )
    })
}

// without a key the file name is used
fn object_key(key: Option<String>, source: &Source) -> Result<String> {
    match (key, source) {
        (Some(key), _) => Ok(key),
        (None, Source::File(path)) => path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToString::to_string)
            .with_context(|| format!("could not get file name from: {}", path.display())),
        (None, Source::Stdin) => Err(anyhow!(
            "No \"key\" found, try: --pipe <s3 provider>/<bucket name>/<key>"
        )),
    }
}

// "key1=value1;key2=value2", already validated by the command line parser
fn parse_meta(meta: &str) -> ObjectMetadata {
    meta.split(';')
        .filter_map(|pair| pair.split_once('='))
        .fold(ObjectMetadata::default(), |meta, (k, v)| {
            meta.with_user(k.trim(), v.trim())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    const CONF: &str = r"---
hosts:
  aws:
    region: us-east-1
    access_key: XXX
    secret_key: YYY
  minio:
    endpoint: http://localhost:9000
    access_key: minioadmin
    secret_key: minioadmin";

    fn matches(tmp_dir: &TempDir, args: &[&str]) -> ArgMatches {
        let config_path = tmp_dir.path().join("config.yml");
        let mut tmp_file = File::create(&config_path).unwrap();
        tmp_file.write_all(CONF.as_bytes()).unwrap();
        let cmd = commands::new(tmp_dir.path());
        let mut argv = vec!["s3chan"];
        argv.extend_from_slice(args);
        cmd.try_get_matches_from(argv).unwrap()
    }

    #[test]
    fn test_get_config_path() {
        assert!(get_config_path().is_ok());
    }

    #[test]
    fn test_setup_file() {
        let tmp_dir = TempDir::new().unwrap();
        let m = matches(
            &tmp_dir,
            &[
                "/tmp/data.bin",
                "aws/my-bucket/dir/data.bin",
                "--checksum",
                "crc32c",
                "--meta",
                "title=someTitle;owner=ops",
                "--content-type",
                "plain/text",
                "--abort-on-failure",
            ],
        );
        let (s3, upload) = setup(&m).unwrap();
        assert_eq!(s3.region().name(), "us-east-1");
        assert_eq!(upload.source, Source::File(PathBuf::from("/tmp/data.bin")));
        assert_eq!(upload.bucket, "my-bucket");
        assert_eq!(upload.key, "dir/data.bin");
        assert_eq!(upload.part_size, 10_485_760);
        assert_eq!(upload.checksum, ChecksumAlgorithm::Crc32c);
        assert_eq!(upload.retries, 3);
        assert!(upload.abort_on_failure);
        assert_eq!(
            upload.meta,
            ObjectMetadata::default()
                .with_content_type("plain/text")
                .with_user("owner", "ops")
                .with_user("title", "someTitle")
        );
    }

    #[test]
    fn test_setup_file_name_as_key() {
        let tmp_dir = TempDir::new().unwrap();
        let m = matches(&tmp_dir, &["/tmp/data.bin", "minio/my-bucket"]);
        let (s3, upload) = setup(&m).unwrap();
        assert_eq!(s3.endpoint().unwrap().as_str(), "http://localhost:9000/");
        assert_eq!(upload.key, "data.bin");
    }

    #[test]
    fn test_setup_pipe() {
        let tmp_dir = TempDir::new().unwrap();
        let m = matches(&tmp_dir, &["--pipe", "aws/my-bucket/stream.log"]);
        let (_, upload) = setup(&m).unwrap();
        assert_eq!(upload.source, Source::Stdin);
        assert_eq!(upload.key, "stream.log");
    }

    #[test]
    fn test_setup_pipe_without_key() {
        let tmp_dir = TempDir::new().unwrap();
        let m = matches(&tmp_dir, &["--pipe", "aws/my-bucket"]);
        assert!(setup(&m).is_err());
    }

    #[test]
    fn test_setup_pipe_with_file() {
        let tmp_dir = TempDir::new().unwrap();
        let m = matches(&tmp_dir, &["--pipe", "/tmp/data.bin", "aws/my-bucket/key"]);
        assert!(setup(&m).is_err());
    }

    #[test]
    fn test_setup_unknown_host() {
        let tmp_dir = TempDir::new().unwrap();
        let m = matches(&tmp_dir, &["/tmp/data.bin", "gcs/my-bucket/key"]);
        let err = setup(&m).unwrap_err();
        assert!(err.to_string().contains("Could not find host"));
    }

    #[test]
    fn test_parse_meta() {
        let meta = parse_meta("key1=value1; key2 = value2");
        assert_eq!(meta.user.get("key1").unwrap(), "value1");
        assert_eq!(meta.user.get("key2").unwrap(), "value2");
        assert!(meta.content_type.is_none());
    }
}
