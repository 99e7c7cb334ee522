//! User display formatting

use crate::models::UserAccount;

/// Format a list of users as a table
pub fn format_user_list(users: &[UserAccount]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let email_width = users.iter().map(|u| u.email.len()).max().unwrap_or(5).max(5);

    let mut output = format!(
        "{:<40}  {:<email_width$}  {:<8}  {}\n",
        "ID",
        "Email",
        "Role",
        "Created",
        email_width = email_width,
    );
    output.push_str(&format!(
        "{:-<40}  {:-<email_width$}  {:-<8}  {:-<10}\n",
        "",
        "",
        "",
        "",
        email_width = email_width,
    ));

    for user in users {
        output.push_str(&format!(
            "{:<40}  {:<email_width$}  {:<8}  {}\n",
            user.id.to_string(),
            user.email,
            user.role.to_string(),
            user.created_at.format("%Y-%m-%d"),
            email_width = email_width,
        ));
    }

    output
}
