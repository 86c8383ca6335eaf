use mwclient::{Credentials, EditRequest, Endpoint, MediaWikiClient, MediaWikiClientConfig};
use std::{io::Write, process::ExitCode};

const USAGE: &str = "usage: mwclient-native <endpoint> <edit|purge|links|users|members> [args...]
    edit <title> <section-title> <markup-file> [content-model]
    purge <title>...
    links <page>
    users
    members <category>";

const LOGIN_NAME_VAR: &str = "MWCLIENT_LOGIN_NAME";
const LOGIN_PASSWORD_VAR: &str = "MWCLIENT_LOGIN_PASSWORD";

fn main() -> ExitCode {
    pretty_env_logger::init();

    let mut args = std::env::args();

    args.next();

    match run(args.collect()) {
        Ok(lines) => {
            let mut stdout = std::io::stdout().lock();

            for line in lines {
                if writeln!(stdout, "{line}").is_err() {
                    return ExitCode::FAILURE;
                }
            }

            ExitCode::SUCCESS
        }
        Err(message) => {
            log::error!("{message}");

            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<Vec<String>, String> {
    let [endpoint, command, rest @ ..] = args.as_slice() else {
        return Err(USAGE.to_string());
    };

    let endpoint = Endpoint::parse(endpoint).map_err(|err| format!("Invalid endpoint: {err}"))?;

    let client = MediaWikiClient::from_config(MediaWikiClientConfig::default());

    match (command.as_str(), rest) {
        ("edit", [title, section_title, markup_file, content_model @ ..]) => {
            let markup = std::fs::read_to_string(markup_file)
                .map_err(|err| format!("Failed to read '{markup_file}': {err}"))?;

            let mut request = EditRequest::new(title, section_title, markup);

            if let Some(content_model) = content_model.first() {
                request = request.content_model(content_model);
            }

            let outcome = client
                .edit_section(&endpoint, &credentials_from_env()?, &request)
                .map_err(|err| err.to_string())?;

            Ok(vec![match (outcome.no_change, outcome.new_revision) {
                (true, _) => format!("{title}: no change"),
                (false, Some(revision)) => format!("{title}: revision {revision}"),
                (false, None) => format!("{title}: saved"),
            }])
        }
        ("purge", titles) if !titles.is_empty() => client
            .purge(&endpoint, titles)
            .map(|pages| {
                pages
                    .into_iter()
                    .map(|page| {
                        if page.missing {
                            format!("{} (missing)", page.title)
                        } else {
                            page.title
                        }
                    })
                    .collect()
            })
            .map_err(|err| err.to_string()),
        ("links", [page]) => client
            .external_links(&endpoint, page)
            .map_err(|err| err.to_string()),
        ("users", []) => client.users(&endpoint).map_err(|err| err.to_string()),
        ("members", [category]) => client
            .category_members(&endpoint, category)
            .map_err(|err| err.to_string()),
        _ => Err(USAGE.to_string()),
    }
}

fn credentials_from_env() -> Result<Credentials, String> {
    let variable = |name: &str| {
        std::env::var(name).map_err(|_| format!("Environment variable {name} must be set"))
    };

    Ok(Credentials::new(
        variable(LOGIN_NAME_VAR)?,
        variable(LOGIN_PASSWORD_VAR)?,
    ))
}
