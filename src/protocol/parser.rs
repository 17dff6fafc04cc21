//! Shell command parsing

use crate::protocol::Command;

// Parse raw command string into Command enum
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let args: Vec<&str> = parts.collect();

    let unknown = || Command::Unknown(trimmed.to_string());

    match (cmd.as_str(), args.as_slice()) {
        ("CONNECT", [account, container, sas_token, rest @ ..]) if rest.len() <= 1 => {
            Command::Connect {
                account: account.to_string(),
                container: container.to_string(),
                sas_token: sas_token.to_string(),
                path: rest.first().map(|p| p.to_string()),
            }
        }
        ("LS" | "LIST", []) => Command::List,
        ("CD", [target]) => Command::Cd(target.to_string()),
        ("CD", []) => Command::Cd("/".to_string()),
        ("PWD", []) => Command::Pwd,
        ("PUT", files) if !files.is_empty() => {
            Command::Put(files.iter().map(|f| f.to_string()).collect())
        }
        ("GET", [name]) => Command::Get {
            name: name.to_string(),
            dest: None,
        },
        ("GET", [name, dest]) => Command::Get {
            name: name.to_string(),
            dest: Some(dest.to_string()),
        },
        ("URL", [name]) => Command::Url(name.to_string()),
        ("RM" | "DEL", [name]) => Command::Rm(name.to_string()),
        ("MKDIR", [name]) => Command::Mkdir(name.to_string()),
        ("SORT", [key, rest @ ..]) if rest.len() <= 1 => {
            let Ok(key) = key.parse() else {
                return unknown();
            };
            let direction = match rest.first() {
                Some(d) => match d.parse() {
                    Ok(direction) => direction,
                    Err(_) => return unknown(),
                },
                None => Default::default(),
            };
            Command::Sort { key, direction }
        }
        ("DISCONNECT", []) => Command::Disconnect,
        ("HELP" | "?", _) => Command::Help,
        ("QUIT" | "Q" | "EXIT", []) => Command::Quit,
        _ => unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{SortDirection, SortKey};

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse_command("QUIT"), Command::Quit);
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(parse_command("ls"), Command::List);
        assert_eq!(parse_command("PWD"), Command::Pwd);
        assert_eq!(parse_command("disconnect"), Command::Disconnect);
        assert_eq!(parse_command("help"), Command::Help);
    }

    #[test]
    fn test_parse_connect() {
        assert_eq!(
            parse_command("CONNECT acct box sv=2024&sig=x reports/2024"),
            Command::Connect {
                account: "acct".into(),
                container: "box".into(),
                sas_token: "sv=2024&sig=x".into(),
                path: Some("reports/2024".into()),
            }
        );
        assert!(matches!(
            parse_command("connect acct box ?sv=1"),
            Command::Connect { path: None, .. }
        ));
        assert!(matches!(parse_command("CONNECT acct box"), Command::Unknown(_)));
    }

    #[test]
    fn test_parse_commands_with_args() {
        assert_eq!(parse_command("CD /some/path"), Command::Cd("/some/path".into()));
        assert_eq!(parse_command("cd"), Command::Cd("/".into()));
        assert_eq!(
            parse_command("PUT a.txt b.txt"),
            Command::Put(vec!["a.txt".into(), "b.txt".into()])
        );
        assert_eq!(
            parse_command("GET report.csv /tmp/out.csv"),
            Command::Get {
                name: "report.csv".into(),
                dest: Some("/tmp/out.csv".into()),
            }
        );
        assert_eq!(parse_command("RM old"), Command::Rm("old".into()));
        assert_eq!(parse_command("MKDIR new"), Command::Mkdir("new".into()));
        assert_eq!(parse_command("URL a.txt"), Command::Url("a.txt".into()));
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(
            parse_command("SORT size desc"),
            Command::Sort {
                key: SortKey::Size,
                direction: SortDirection::Desc,
            }
        );
        assert_eq!(
            parse_command("sort NAME"),
            Command::Sort {
                key: SortKey::Name,
                direction: SortDirection::Asc,
            }
        );
        assert!(matches!(parse_command("SORT date"), Command::Unknown(_)));
        assert!(matches!(parse_command("SORT size up"), Command::Unknown(_)));
    }

    #[test]
    fn test_missing_arguments_are_unknown() {
        assert_eq!(parse_command("PUT"), Command::Unknown("PUT".into()));
        assert_eq!(parse_command("RM"), Command::Unknown("RM".into()));
        assert_eq!(parse_command("  "), Command::Unknown("".into()));
        assert_eq!(parse_command("FOO bar"), Command::Unknown("FOO bar".into()));
    }
}
