use std::fs;
use std::path::Path;

const PLACEHOLDER_INDEX: &str = "<!doctype html><html><body>\
<p>Frontend not built. Run <code>trunk build</code> in <code>frontend/</code>.</p>\
</body></html>";

fn main() {
    let out_dir = Path::new("static");
    let dist_dir = Path::new("../frontend/dist");

    if dist_dir.exists() {
        let _ = fs::remove_dir_all(out_dir);
        fs::create_dir_all(out_dir).expect("create static dir");
        fs_extra::dir::copy(
            dist_dir,
            out_dir,
            &fs_extra::dir::CopyOptions::new().overwrite(true).copy_inside(true),
        )
        .expect("copy frontend dist");
    }

    // include_dir! needs the directory to exist even without a frontend build
    let embedded = out_dir.join("dist");
    if !embedded.exists() {
        fs::create_dir_all(&embedded).expect("create static/dist");
        fs::write(embedded.join("index.html"), PLACEHOLDER_INDEX).expect("write placeholder index");
    }
    println!("cargo:rerun-if-changed=../frontend/dist");
}
