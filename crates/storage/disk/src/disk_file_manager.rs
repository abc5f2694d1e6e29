use crate::api::FileManager;
use crate::disk_error::DiskError;
use page::{PageId, PAGE_SIZE};
use std::fs::{File, OpenOptions};
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::FileExt;
#[cfg(windows)]
use std::os::windows::fs::FileExt;

/// A `FileManager` backed by a single on-disk file, addressed by flat page
/// index. Single-threaded: no internal locking.
#[derive(Debug)]
pub struct DiskFileManager {
    file: File,
    page_count: u32,
}

impl DiskFileManager {
    /// Opens (creating if necessary) the backing file at `path`. The
    /// current page count is derived from the file's length.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DiskError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let len = file.metadata()?.len();
        let page_count = (len / PAGE_SIZE as u64) as u32;

        Ok(Self { file, page_count })
    }

    #[inline]
    fn read_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
        #[cfg(unix)]
        {
            file.read_at(buf, offset)
        }
        #[cfg(windows)]
        {
            file.seek_read(buf, offset)
        }
    }

    #[inline]
    fn write_at(file: &File, buf: &[u8], offset: u64) -> std::io::Result<usize> {
        #[cfg(unix)]
        {
            file.write_at(buf, offset)
        }
        #[cfg(windows)]
        {
            file.seek_write(buf, offset)
        }
    }
}

impl FileManager for DiskFileManager {
    fn read_page(&mut self, page_id: PageId, destination: &mut [u8; PAGE_SIZE]) -> Result<(), DiskError> {
        let offset = page_id.as_u32() as u64 * PAGE_SIZE as u64;
        let n = Self::read_at(&self.file, destination, offset)?;
        if n < PAGE_SIZE {
            destination[n..].fill(0);
        }
        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, page_data: &[u8; PAGE_SIZE]) -> Result<(), DiskError> {
        let offset = page_id.as_u32() as u64 * PAGE_SIZE as u64;

        let mut written = 0;
        while written < PAGE_SIZE {
            let n = Self::write_at(&self.file, &page_data[written..], offset + written as u64)?;
            if n == 0 {
                return Err(DiskError::Io(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "disk write wrote 0 bytes",
                )));
            }
            written += n;
        }

        if page_id.as_u32() >= self.page_count {
            self.page_count = page_id.as_u32() + 1;
        }

        Ok(())
    }

    fn allocate_page(&mut self) -> Result<PageId, DiskError> {
        let page_id = PageId::new(self.page_count);
        self.write_page(page_id, &[0u8; PAGE_SIZE])?;
        Ok(page_id)
    }

    fn page_count(&self) -> u32 {
        self.page_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn allocate_write_and_read_back() {
        let dir = tempdir().unwrap();
        let mut manager = DiskFileManager::open(dir.path().join("heap.db")).unwrap();

        let page_id = manager.allocate_page().unwrap();
        assert_eq!(manager.page_count(), 1);

        let mut page = [0u8; PAGE_SIZE];
        page[0] = 0x42;
        manager.write_page(page_id, &page).unwrap();

        let mut read_back = [0xFFu8; PAGE_SIZE];
        manager.read_page(page_id, &mut read_back).unwrap();
        assert_eq!(read_back, page);
    }

    #[test]
    fn reading_an_unwritten_tail_zero_fills() {
        let dir = tempdir().unwrap();
        let mut manager = DiskFileManager::open(dir.path().join("heap.db")).unwrap();
        let page_id = manager.allocate_page().unwrap();

        let mut destination = [0xAAu8; PAGE_SIZE];
        manager.read_page(page_id, &mut destination).unwrap();
        assert_eq!(destination, [0u8; PAGE_SIZE]);
    }

    #[test]
    fn reopening_recovers_page_count_from_file_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heap.db");
        {
            let mut manager = DiskFileManager::open(&path).unwrap();
            manager.allocate_page().unwrap();
            manager.allocate_page().unwrap();
        }

        let manager = DiskFileManager::open(&path).unwrap();
        assert_eq!(manager.page_count(), 2);
    }
}
