//! Email rendering for each notification kind.
//!
//! Subjects and copy follow the product voice; every body goes through
//! the same dark-theme shell so the four kinds look like one product.

use indoc::formatdoc;

use super::Notification;

/// A rendered email ready for the delivery API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Render the subject and HTML body for a notification.
pub fn render(notification: &Notification) -> RenderedEmail {
    match notification {
        Notification::Welcome {
            habit_name,
            first_task,
            ..
        } => RenderedEmail {
            subject: format!("Your Solo journey begins: {habit_name}"),
            html: shell(
                "One habit. One step at a time.",
                "Welcome to Solo",
                &formatdoc! {r#"
                    <p>You've committed to building <strong>{habit_name}</strong>. That takes guts.</p>
                    <p>Here's your first micro-task:</p>
                    {task_card}
                    <p>That's it. Just do this one thing today. We'll check in with you daily.</p>
                    <p style="opacity: 0.6; font-size: 14px;">Remember: the goal isn't perfection. It's showing up.</p>
                "#, task_card = task_card(first_task, None)},
            ),
        },
        Notification::Reminder {
            habit_name,
            task,
            streak,
            level,
            ..
        } => {
            let streak_text = if *streak > 0 {
                format!("You're on a {streak}-day streak. Keep it alive.")
            } else {
                "Today's a fresh start. One check-in is all it takes.".to_string()
            };
            RenderedEmail {
                subject: format!("{habit_name}: {task}"),
                html: shell(
                    &format!("Level {level} \u{2022} {streak_text}"),
                    "Today's task",
                    &formatdoc! {r#"
                        {task_card}
                        <p>{streak_text}</p>
                        <p style="opacity: 0.6; font-size: 14px;">When you're done, open Solo and hit the check-in button.</p>
                    "#, task_card = task_card(task, Some(*level))},
                ),
            }
        }
        Notification::LevelUp {
            habit_name,
            new_level,
            new_task,
            ..
        } => RenderedEmail {
            subject: format!("Level up! {habit_name} \u{2192} Level {new_level}"),
            html: shell(
                "You've proven consistency. Time to grow.",
                &format!("Level {new_level} unlocked"),
                &formatdoc! {r#"
                    <p>You crushed Level {previous} of <strong>{habit_name}</strong>. Consistency proven.</p>
                    <p>Your new daily task:</p>
                    {task_card}
                    <p>Same approach: just show up and do it. You've already proven you can.</p>
                "#,
                previous = new_level - 1,
                task_card = task_card(new_task, Some(*new_level))},
            ),
        },
        Notification::Graduation {
            habit_name,
            total_days,
            ..
        } => RenderedEmail {
            subject: format!("You graduated: {habit_name} is now part of you"),
            html: shell(
                "One habit conquered. Ready for the next?",
                &format!("{habit_name} \u{2014} Graduated"),
                &formatdoc! {r#"
                    <div style="text-align: center; font-size: 48px; margin: 20px 0;">{cap}</div>
                    <p><strong>{habit_name}</strong> is no longer something you're building. It's something you <em>do</em>.</p>
                    <p>You showed up for <strong>{total_days} days</strong> and worked through all 5 levels. That's rare.</p>
                    <p>When you're ready, open Solo to pick your next habit. The stack grows.</p>
                    <p style="opacity: 0.6; font-size: 14px;">One at a time. That's how change compounds.</p>
                "#, cap = '\u{1F393}'},
            ),
        },
    }
}

/// The highlighted card showing the day's task.
fn task_card(task: &str, level: Option<u32>) -> String {
    let level_line = match level {
        Some(level) => format!(
            r#"<p style="font-size: 13px; opacity: 0.5; margin: 8px 0 0 0;">Level {level} of 5</p>"#
        ),
        None => String::new(),
    };
    formatdoc! {r#"
        <div style="background: #1a1a2e; border: 1px solid rgba(255,255,255,0.1); border-radius: 12px; padding: 20px; margin: 20px 0; text-align: center;">
          <p style="font-size: 20px; font-weight: 600; margin: 0;">{task}</p>
          {level_line}
        </div>
    "#}
}

/// The shared HTML shell: preheader, wordmark, heading, body, footer.
fn shell(preheader: &str, heading: &str, body: &str) -> String {
    formatdoc! {r#"
        <!DOCTYPE html>
        <html>
        <head>
          <meta charset="utf-8">
          <meta name="viewport" content="width=device-width, initial-scale=1.0">
          <title>{heading}</title>
        </head>
        <body style="margin: 0; padding: 0; background-color: #0a0a0f; color: #f0f0f5; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;">
          <div style="display: none; max-height: 0; overflow: hidden;">{preheader}</div>
          <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #0a0a0f;">
            <tr>
              <td align="center" style="padding: 40px 20px;">
                <table width="100%" cellpadding="0" cellspacing="0" style="max-width: 480px;">
                  <tr>
                    <td style="padding-bottom: 32px;">
                      <span style="font-size: 18px; font-weight: 700; letter-spacing: -0.5px;">
                        habit<span style="color: #6c63ff;">space</span>
                      </span>
                      <span style="font-size: 12px; opacity: 0.4; margin-left: 8px;">solo</span>
                    </td>
                  </tr>
                  <tr>
                    <td style="padding-bottom: 24px;">
                      <h1 style="margin: 0; font-size: 28px; font-weight: 700; letter-spacing: -0.5px; line-height: 1.2;">{heading}</h1>
                    </td>
                  </tr>
                  <tr>
                    <td style="font-size: 16px; line-height: 1.6; color: #d0d0d8;">{body}</td>
                  </tr>
                  <tr>
                    <td style="padding-top: 40px; border-top: 1px solid rgba(255,255,255,0.05); margin-top: 40px;">
                      <p style="font-size: 12px; opacity: 0.3; margin: 0;">Solo by habitspace {bullet} One habit at a time</p>
                    </td>
                  </tr>
                </table>
              </td>
            </tr>
          </table>
        </body>
        </html>
    "#, bullet = '\u{2022}'}
}
