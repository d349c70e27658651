use std::{
    io::{self, Write},
    path::PathBuf,
};

use crate::{
    cli::{ImportOptions, Session, create, import},
    config::Config,
    failure, info,
    types::{InsertMode, PlaylistDescriptor},
    warning,
};

const MENU: &str = "What would you like to do?
    1. Create playlist from CSV
    2. Create a playlist
    3. Quit
Enter 1, 2, or 3: ";

/// Interactive loop offering the playlist operations until the user quits.
///
/// A failed operation is reported and the menu is shown again. End of input
/// on stdin quits like option 3.
pub async fn menu(session: &Session, config: &Config, mode: InsertMode) {
    loop {
        let Some(choice) = prompt(MENU) else {
            return;
        };

        match choice.as_str() {
            "1" => {
                let Some(descriptor) = prompt_descriptor() else {
                    return;
                };
                let Some(path) = prompt("Enter path to csv, e.g. csvs/myplay.csv: ") else {
                    return;
                };
                let options = ImportOptions {
                    mode,
                    ..ImportOptions::default()
                };
                if let Err(e) =
                    import(session, config, &PathBuf::from(path), &descriptor, options).await
                {
                    failure!("Import failed: {}", e);
                }
            }
            "2" => {
                let Some(descriptor) = prompt_descriptor() else {
                    return;
                };
                if let Err(e) = create(session, &descriptor).await {
                    failure!("Creating playlist failed: {}", e);
                }
            }
            "3" => {
                info!("Bye.");
                return;
            }
            other => warning!("Unknown option '{}'", other),
        }
    }
}

fn prompt_descriptor() -> Option<PlaylistDescriptor> {
    let name = loop {
        let name = prompt("Enter playlist name: ")?;
        if !name.is_empty() {
            break name;
        }
        warning!("The playlist name cannot be empty.");
    };
    let description = prompt("Enter description for playlist: ")?;

    Some(PlaylistDescriptor {
        name,
        description,
        public: true,
    })
}

/// Prints `label` and reads one trimmed line. `None` on end of input.
fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    io::stdout().flush().ok()?;

    let mut buffer = String::new();
    match io::stdin().read_line(&mut buffer) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buffer.trim().to_string()),
    }
}
