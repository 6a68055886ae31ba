//! CLI argument parsing tests.

use clap::Parser;
use fortiapi::cli::{Cli, Command};
use fortiapi::{MovePosition, Scope};

#[test]
fn test_cli_parses_get_subcommand() {
    let cli = Cli::parse_from(["fortiapi", "get", "firewall/address", "web-01"]);

    assert!(!cli.json);
    match cli.command {
        Command::Get {
            resource,
            mkey,
            query,
        } => {
            assert_eq!(resource, "firewall/address");
            assert_eq!(mkey.as_deref(), Some("web-01"));
            assert!(query.filter.is_empty());
        }
        _ => panic!("Expected Get command"),
    }
}

#[test]
fn test_cli_parses_repeated_filters() {
    let cli = Cli::parse_from([
        "fortiapi",
        "get",
        "firewall/address",
        "--filter",
        "type==fqdn",
        "--filter",
        "name=@corp,name=@lab",
        "--count",
        "10",
    ]);

    match cli.command {
        Command::Get { query, .. } => {
            let params = query.to_query(None).to_params();
            assert_eq!(
                params.get_all("filter"),
                vec!["type==fqdn", "name=@corp,name=@lab"]
            );
            assert_eq!(params.get("count"), Some("10"));
        }
        _ => panic!("Expected Get command"),
    }
}

#[test]
fn test_cli_all_conflicts_with_window() {
    let result = Cli::try_parse_from([
        "fortiapi",
        "get",
        "firewall/address",
        "--all",
        "--start",
        "5",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_parses_set_subcommand() {
    let cli = Cli::parse_from([
        "fortiapi",
        "set",
        "firewall/address",
        "--field",
        "name=web-03",
        "--field",
        "subnet=10.0.1.12 255.255.255.255",
    ]);

    match cli.command {
        Command::Set { resource, payload } => {
            assert_eq!(resource, "firewall/address");
            assert_eq!(
                payload.fields,
                vec![
                    ("name".to_string(), "web-03".to_string()),
                    ("subnet".to_string(), "10.0.1.12 255.255.255.255".to_string()),
                ]
            );
            assert!(payload.data.is_none());
        }
        _ => panic!("Expected Set command"),
    }
}

#[test]
fn test_cli_parses_move_with_reference() {
    let cli = Cli::parse_from([
        "fortiapi",
        "move",
        "firewall/policy",
        "3",
        "after",
        "--reference",
        "1",
    ]);

    match cli.command {
        Command::Move {
            mkey,
            position,
            reference,
            ..
        } => {
            assert_eq!(mkey, "3");
            assert_eq!(position, MovePosition::After);
            assert_eq!(reference.as_deref(), Some("1"));
        }
        _ => panic!("Expected Move command"),
    }
}

#[test]
fn test_cli_rejects_unknown_position() {
    let result = Cli::try_parse_from(["fortiapi", "move", "firewall/policy", "3", "middle"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_parses_clone_subcommand() {
    let cli = Cli::parse_from(["fortiapi", "clone", "firewall/policy", "2", "20"]);

    match cli.command {
        Command::Clone {
            resource,
            mkey,
            new_mkey,
        } => {
            assert_eq!(resource, "firewall/policy");
            assert_eq!(mkey, "2");
            assert_eq!(new_mkey, "20");
        }
        _ => panic!("Expected Clone command"),
    }
}

#[test]
fn test_cli_json_flag_is_global() {
    let cli = Cli::parse_from(["fortiapi", "resources", "--json"]);
    assert!(cli.json);

    let cli = Cli::parse_from(["fortiapi", "--json", "fields", "firewall/policy"]);
    assert!(cli.json);
}

#[test]
fn test_cli_scope_flags() {
    let cli = Cli::parse_from(["fortiapi", "--vdom", "dmz", "exists", "firewall/address", "x"]);
    assert_eq!(cli.scope(), Scope::vdom("dmz"));

    let cli = Cli::parse_from(["fortiapi", "delete", "firewall/address", "x", "--global"]);
    assert_eq!(cli.scope(), Scope::Global);

    let result = Cli::try_parse_from([
        "fortiapi",
        "--vdom",
        "dmz",
        "--global",
        "delete",
        "firewall/address",
        "x",
    ]);
    assert!(result.is_err());
}
