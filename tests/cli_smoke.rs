use std::path::PathBuf;
use std::process::Command;

fn pdftoppm_available() -> bool {
    Command::new("pdftoppm")
        .arg("-v")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[test]
fn cli_html_writes_slideshow() {
    if !pdftoppm_available() {
        eprintln!("skipping: pdftoppm unavailable");
        return;
    }

    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let pdf_path = dir.join("deck.pdf");
    let out_path = dir.join("show.html");
    let _ = std::fs::remove_file(&out_path);

    // One empty page is enough to exercise the whole pipeline.
    let mut body = Vec::<u8>::new();
    body.extend_from_slice(b"%PDF-1.4\n");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>",
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>",
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 150] >>",
    ];
    let mut offsets = Vec::new();
    for (i, obj) in objects.iter().enumerate() {
        offsets.push(body.len());
        body.extend_from_slice(format!("{} 0 obj\n{obj}\nendobj\n", i + 1).as_bytes());
    }
    let xref_offset = body.len();
    body.extend_from_slice(b"xref\n0 4\n0000000000 65535 f \n");
    for off in &offsets {
        body.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    body.extend_from_slice(
        format!("trailer\n<< /Size 4 /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n").as_bytes(),
    );
    std::fs::write(&pdf_path, body).unwrap();

    let exe = std::env::var_os("CARGO_BIN_EXE_deckcast")
        .map(PathBuf::from)
        .expect("cargo provides the binary path for integration tests");
    let status = Command::new(exe)
        .args(["html", "--in"])
        .arg(&pdf_path)
        .args(["--out"])
        .arg(&out_path)
        .args(["--zoom", "0.5"])
        .status()
        .unwrap();

    assert!(status.success());
    let html = std::fs::read_to_string(&out_path).unwrap();
    assert!(html.contains("data:image/png;base64,"));
    assert!(html.contains("Slide 1 of 1"));
}
