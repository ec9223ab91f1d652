//! Terraform command construction.

/// Kind of Terraform command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `terraform state rm`.
    Rm,
    /// `terraform apply -target`.
    Apply,
    /// `terraform import`.
    Import,
}

/// A generated command and the resource it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    /// Command kind.
    pub kind: CommandKind,
    /// Display name of the owning resource.
    pub name: String,
    /// Full command line, quoted for the platform shell.
    pub command: String,
    /// Program and arguments, unquoted. This is what gets executed.
    pub argv: Vec<String>,
}

/// Shell a printed command line is meant to be pasted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    /// `sh`, `bash`, `zsh` and friends.
    Posix,
    /// Windows `cmd.exe`.
    Cmd,
}

impl Shell {
    /// Shell of the platform this binary was built for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) { Self::Cmd } else { Self::Posix }
    }

    /// Quotes `value` for this shell when it contains anything beyond the
    /// characters found in plain resource addresses and IDs.
    #[must_use]
    pub fn quote(self, value: &str) -> String {
        let plain = !value.is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c));

        if plain {
            return value.to_string();
        }

        match self {
            Self::Posix => format!("'{}'", value.replace('\'', r"'\''")),
            Self::Cmd => format!("\"{}\"", value.replace('"', r#"\""#)),
        }
    }
}

/// Builds Terraform command lines for one Terraform binary.
#[derive(Debug, Clone)]
pub struct TerraformCommands {
    /// Binary to invoke, e.g. `terraform` or `tofu`.
    binary: String,
    /// Shell the display text is quoted for.
    shell: Shell,
}

impl Default for TerraformCommands {
    fn default() -> Self {
        Self::new("terraform")
    }
}

impl TerraformCommands {
    /// Creates a builder for `binary`, quoting for the platform shell.
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            shell: Shell::current(),
        }
    }

    /// Quotes display text for `shell` instead of the platform shell.
    #[must_use]
    pub const fn with_shell(mut self, shell: Shell) -> Self {
        self.shell = shell;
        self
    }

    /// `state rm <address>`: untrack a resource without touching it.
    #[must_use]
    pub fn state_rm(&self, name: &str, address: &str) -> CommandRecord {
        self.record(CommandKind::Rm, name, vec![
            String::from("state"),
            String::from("rm"),
            address.to_string(),
        ])
    }

    /// `apply -target=<address>`: apply the plan for one resource only.
    #[must_use]
    pub fn apply_target(&self, name: &str, address: &str) -> CommandRecord {
        self.record(CommandKind::Apply, name, vec![
            String::from("apply"),
            format!("-target={address}"),
        ])
    }

    /// `import <address> <id>`: bind an existing resource to an address.
    #[must_use]
    pub fn import(&self, name: &str, address: &str, id: &str) -> CommandRecord {
        self.record(CommandKind::Import, name, vec![
            String::from("import"),
            address.to_string(),
            id.to_string(),
        ])
    }

    fn record(&self, kind: CommandKind, name: &str, args: Vec<String>) -> CommandRecord {
        let mut command = self.binary.clone();
        for arg in &args {
            command.push(' ');
            match arg.strip_prefix("-target=") {
                Some(address) => {
                    command.push_str("-target=");
                    command.push_str(&self.shell.quote(address));
                }
                None => command.push_str(&self.shell.quote(arg)),
            }
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(self.binary.clone());
        argv.extend(args);

        CommandRecord {
            kind,
            name: name.to_string(),
            command,
            argv,
        }
    }
}

/// Quotes `value` for the platform shell.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    Shell::current().quote(value)
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Rm => "rm",
            Self::Apply => "apply",
            Self::Import => "import",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for CommandRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_commands() {
        let tf = TerraformCommands::default();

        assert_eq!(
            tf.state_rm("disk1", "azurerm_managed_disk.disk1").command,
            "terraform state rm azurerm_managed_disk.disk1"
        );
        assert_eq!(
            tf.apply_target("disk1", "azurerm_managed_disk.disk1").command,
            "terraform apply -target=azurerm_managed_disk.disk1"
        );

        let import = tf.import(
            "disk1",
            "azurerm_managed_disk.disk1",
            "/subscriptions/X/resourceGroups/rg1/providers/Microsoft.Compute/disks/disk1",
        );
        assert_eq!(import.kind, CommandKind::Import);
        assert_eq!(
            import.command,
            "terraform import azurerm_managed_disk.disk1 /subscriptions/X/resourceGroups/rg1/providers/Microsoft.Compute/disks/disk1"
        );
    }

    #[test]
    fn test_indexed_addresses_are_quoted() {
        let tf = TerraformCommands::new("tofu").with_shell(Shell::Posix);
        assert_eq!(
            tf.state_rm("vm", r#"module.vms.azurerm_virtual_machine.this["web"]"#).command,
            r#"tofu state rm 'module.vms.azurerm_virtual_machine.this["web"]'"#
        );
        assert_eq!(
            tf.apply_target("vm", "azurerm_virtual_machine.this[0]").command,
            "tofu apply -target='azurerm_virtual_machine.this[0]'"
        );
    }

    #[test]
    fn test_cmd_quoting() {
        let tf = TerraformCommands::default().with_shell(Shell::Cmd);
        assert_eq!(
            tf.state_rm("vm", r#"module.vms.azurerm_virtual_machine.this["web"]"#).command,
            r#"terraform state rm "module.vms.azurerm_virtual_machine.this[\"web\"]""#
        );
        assert_eq!(
            tf.apply_target("vm", "azurerm_virtual_machine.this[0]").command,
            r#"terraform apply -target="azurerm_virtual_machine.this[0]""#
        );
        assert_eq!(Shell::Cmd.quote("it's"), r#""it's""#);
    }

    #[test]
    fn test_argv_is_unquoted() {
        for shell in [Shell::Posix, Shell::Cmd] {
            let record = TerraformCommands::default()
                .with_shell(shell)
                .state_rm("vm", r#"module.vms.azurerm_virtual_machine.this["web"]"#);
            assert_eq!(
                record.argv,
                vec![
                    "terraform",
                    "state",
                    "rm",
                    r#"module.vms.azurerm_virtual_machine.this["web"]"#,
                ]
            );
        }

        let apply = TerraformCommands::default().apply_target("vm", "a.b[0]");
        assert_eq!(apply.argv, vec!["terraform", "apply", "-target=a.b[0]"]);
    }

    #[test]
    fn test_posix_quote() {
        assert_eq!(Shell::Posix.quote("a.b_c-d/e"), "a.b_c-d/e");
        assert_eq!(Shell::Posix.quote(""), "''");
        assert_eq!(Shell::Posix.quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("a.b"), "a.b");
    }
}
