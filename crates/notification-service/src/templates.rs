use crate::{Notice, NoticeType};

pub struct EmailTemplate;

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl EmailTemplate {
    pub fn render(notice: &Notice, site_url: &str) -> String {
        let site_url = escape_html(site_url.trim_end_matches('/'));

        let body_content = match &notice.notice_type {
            NoticeType::Welcome { username } => {
                let username = escape_html(username);
                format!(
                    r#"<div style="background:#1e293b;color:#fff;padding:20px;border-radius:8px 8px 0 0;">
  <h3 style="margin:0;">Welcome to Prodigal, <strong>{username}!</strong></h3>
</div>
<div style="padding:16px 20px;text-align:center;">
  <img src="{site_url}/static/images/main_logo.png" alt="Prodigal" style="max-width:240px;">
  <p style="color:#334155;margin:16px 0;">Thank you for signing up</p>
  <a href="{site_url}/" style="display:inline-block;background:#3b82f6;color:#fff;padding:10px 20px;border-radius:6px;text-decoration:none;">Go to Prodigal</a>
</div>"#
                )
            }
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1"></head>
<body style="margin:0;padding:0;background:#f1f5f9;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;">
<table width="100%" cellpadding="0" cellspacing="0" style="background:#f1f5f9;padding:32px 0;">
  <tr><td align="center">
    <table width="600" cellpadding="0" cellspacing="0" style="background:#ffffff;border-radius:8px;overflow:hidden;box-shadow:0 1px 3px rgba(0,0,0,0.1);">
      <tr><td>
        {body_content}
      </td></tr>
      <tr><td style="padding:16px 20px;border-top:1px solid #e2e8f0;">
        <p style="margin:0;color:#94a3b8;font-size:12px;">Sent at {ts} UTC</p>
      </td></tr>
    </table>
  </td></tr>
</table>
</body>
</html>"#,
            ts = notice.timestamp.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}
