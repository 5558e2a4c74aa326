//! Reply texts sent to chats.

/// Command menu appended to hints.
pub const MENU: &str = "/goals\n/create\n/cancel";

pub const NO_GOALS: &str = "You don't have goals!";
pub const NO_CATEGORIES: &str = "You have not categories!";
pub const CATEGORY_NOT_FOUND: &str = "Category not exists!";
pub const ASK_TITLE: &str = "Please set goal title";
pub const GOAL_CREATED: &str = "New goal created";
pub const EMPTY_TITLE: &str = "Goal title can't be empty";
pub const TRY_AGAIN: &str = "Something went wrong, please try again later";
pub const VERIFIED: &str = "Bot token verified!";

/// Longest goal title the tracker accepts.
pub const MAX_TITLE_CHARS: usize = 260;

pub fn greeting(code: &str) -> String {
    format!("Hello there!\nYour verification code: {code}")
}

pub fn verification_reminder(code: &str) -> String {
    format!("This chat is not verified yet.\nYour verification code: {code}")
}

pub fn command_not_found() -> String {
    format!("Command not found!\n{MENU}")
}

pub fn chat_closed() -> String {
    format!("Chat is closed\nType any command:\n{MENU}")
}

pub fn title_too_long() -> String {
    format!("Goal title must be at most {MAX_TITLE_CHARS} characters")
}

/// Newline-joined `id title` lines under a heading.
pub fn listing<'a>(heading: &str, items: impl IntoIterator<Item = (i64, &'a str)>) -> String {
    let mut out = heading.to_string();
    for (id, title) in items {
        out.push('\n');
        out.push_str(&format!("{id} {title}"));
    }
    out
}
