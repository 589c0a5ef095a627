use std::fs::File;
use std::io::BufRead;

/// Wraps an opened trace file for line by line replay
///
/// On unix the whole file is mapped and the OS is told it will be read front to back, elsewhere
/// a plain buffered reader is used. Either way the simulator sees a `BufRead`
pub fn get_reader(file: File) -> Result<impl BufRead, String> {
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        const TRACE_BUFFER_SIZE: usize = 64 * 1024;
        Ok(BufReader::with_capacity(TRACE_BUFFER_SIZE, file))
    }
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        // Safety: the trace is only read, and isn't expected to change while a run is in progress
        let map = unsafe { Mmap::map(&file) }.map_err(|e| format!("Couldn't map the trace file into memory: {e}"))?;
        map.advise(Advice::Sequential).map_err(|e| format!("Couldn't advise sequential access on the trace: {e}"))?;
        Ok(Cursor::new(map))
    }
}
