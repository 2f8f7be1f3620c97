use super::{escape_html, Page, Toast, LOGO_URL};

/// Login form, keeping the submitted username after a failed attempt.
pub fn login_page(username: &str, toast: Option<Toast>) -> String {
    let body = format!(
        r#"<main class="centered">
  <div class="panel login-panel">
    <img src="{logo}" alt="SCode Logo" class="logo">
    <h2>Welcome Back</h2>
    <form method="post" action="/login" class="form">
      <label for="username">Username</label>
      <input id="username" name="username" type="text" value="{username}" placeholder="Enter your username" autocomplete="username" required>
      <label for="password">Password</label>
      <input id="password" name="password" type="password" placeholder="Enter your password" autocomplete="current-password" required>
      <button type="submit" class="btn btn-primary btn-block">Sign In</button>
    </form>
    <a href="/" class="back-link">Back to Home</a>
  </div>
</main>"#,
        logo = LOGO_URL,
        username = escape_html(username),
    );
    Page::new("Login", body).toast(toast).render()
}
