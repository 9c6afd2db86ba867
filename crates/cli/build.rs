use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("stitchpress")
        .version("1.0.0")
        .author("Stitchpress Contributors")
        .about("Build a static site from a headless WordPress API")
        .subcommand(
            clap::Command::new("build")
                .about("Fetch all content and generate the static site")
                .arg(clap::arg!(--api_url <URL> "CMS API base URL (overrides WP_API_URL)"))
                .arg(
                    clap::arg!(--build_dir <DIR> "Output directory")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    clap::arg!(--templates_dir <DIR> "Template directory")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            clap::Command::new("print")
                .about("Aggregate assignment pages into one printable document")
                .arg(clap::arg!([SLUG] "Single page slug"))
                .arg(clap::arg!(--site <DIR_OR_URL> "Built site: output directory or deployed base URL"))
                .arg(clap::arg!(--all "Print every assignment page"))
                .arg(clap::arg!(--slugs <SLUGS> "Comma-separated slug list"))
                .arg(
                    clap::arg!(-o --output <FILE> "Where to write the printable document")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "stitchpress", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "stitchpress", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "stitchpress", &completions_dir).unwrap();
}
