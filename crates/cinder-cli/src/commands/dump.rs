use std::path::PathBuf;

use cinder_bytecode::{Colors, Image, dump};

use super::error::CliError;

pub struct DumpArgs {
    pub image_path: PathBuf,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    let image = Image::from_path(&args.image_path).unwrap_or_else(|source| {
        CliError::Image {
            path: args.image_path.clone(),
            source,
        }
        .exit()
    });

    let colors = Colors::new(args.color);
    print!("{}", dump(&image, colors));
}
