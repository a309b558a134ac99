mod analysis;
mod app;
mod audio;
mod config;
mod error;
mod library;
mod runtime;
mod ui;
mod visual;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
