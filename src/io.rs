use std::{io, path::Path};

use tokio::{
    fs::{create_dir_all, File},
    io::AsyncWriteExt,
};

async fn create_parent_dirs_for(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => create_dir_all(parent).await,
        _ => Ok(()),
    }
}

pub async fn create_file<P>(name: P) -> io::Result<File>
where
    P: AsRef<Path>,
{
    create_parent_dirs_for(name.as_ref()).await?;
    File::create(name).await
}

/// Write `bytes` to `name`, replacing whatever was there.
pub async fn save_file<P, B>(name: P, bytes: B) -> io::Result<()>
where
    P: AsRef<Path>,
    B: AsRef<[u8]>,
{
    let mut file = create_file(name).await?;
    file.write_all(bytes.as_ref()).await?;
    file.flush().await
}
