use colored::Colorize;
use s3chan::cli;
use std::process::exit;

#[tokio::main]
async fn main() {
    let (s3, upload) = match cli::start() {
        Ok(rs) => rs,
        Err(e) => {
            eprintln!("{}", format!("{e:#}").red());
            exit(1);
        }
    };

    match cli::upload(&s3, &upload).await {
        Ok(object) => {
            if !object.location.is_empty() {
                println!("{}", object.location);
            }
            println!("ETag: {}", object.e_tag);
        }
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("{}", format!("{e:#}").red());
            exit(1);
        }
    }
}
