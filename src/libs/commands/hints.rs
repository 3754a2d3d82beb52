/// One entry of the composer's slash-command catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlashCommand {
    pub command: &'static str,
    /// Text placed in the composer when the hint is tapped.
    pub template: &'static str,
    pub syntax: &'static str,
    pub description: &'static str,
    pub example: &'static str,
    pub icon: &'static str,
}

pub const SLASH_COMMANDS: &[SlashCommand] = &[SlashCommand {
    command: "/pay",
    template: "/pay ",
    syntax: "/pay <amount> <token>",
    description: "Send a crypto payment",
    example: "/pay 0.01 ETH",
    icon: "\u{1F4B8}",
}];

/// Commands whose name starts with the first word typed so far. Nothing is
/// suggested unless the input starts with `/`.
pub fn matching_commands(input: &str) -> Vec<&'static SlashCommand> {
    if !input.starts_with('/') {
        return Vec::new();
    }
    let typed = input.to_lowercase();
    let head = typed.split(' ').next().unwrap_or_default();
    SLASH_COMMANDS
        .iter()
        .filter(|command| command.command.starts_with(head))
        .collect()
}
