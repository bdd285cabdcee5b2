//! Launcher page: a full-viewport frame around the standalone page.

/// Returns the launcher markup embedding `standalone_file` (relative to the launcher).
pub fn launcher_html(standalone_file: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en-us">
<head>
    <meta charset="utf-8">
    <meta http-equiv="Content-Type" content="text/html; charset=utf-8">
    <title>Game Launcher</title>
    <style>
        body {{
            margin: 0;
            padding: 0;
            background: #000;
            overflow: hidden;
        }}
        iframe {{
            width: 100vw;
            height: 100vh;
            border: none;
        }}
    </style>
</head>
<body>
    <iframe src="{standalone_file}" allow="autoplay; fullscreen; gamepad"></iframe>
</body>
</html>
"#
    )
}
