pub const PROMPT_HINT: &str = "Type `help` for commands.";

pub fn help_lines() -> &'static [&'static str] {
    &[
        "Commands:",
        "  open <path>   select an image and upload it (or just paste/drop a path)",
        "  generate      submit the uploaded image for vector-art conversion",
        "  download      save the result into the output directory",
        "  reset         clear the selection and cancel work in progress",
        "  dismiss       clear the current message",
        "  status        show the current state again",
        "  help          show this list",
        "  quit          exit",
        "Buttons in [brackets] are available; (parenthesized) ones are not.",
    ]
}
