//! Source map for bidirectional mapping between addresses and source lines

/// Bidirectional mapping between assembled cells and source lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    /// Forward map: first cell of each emitting line → source location.
    /// Sorted by address for binary search once finalized.
    address_to_source: Vec<(u32, SourceLocation)>,

    /// Reverse map: source line → emitted address range.
    /// Sorted by line number for binary search once finalized.
    source_to_address: Vec<(usize, AddressRange)>,
}

/// A location in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,

    /// Number of cells the line emitted
    pub length: u32,
}

/// A range of cell addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    /// Starting address (inclusive)
    pub start: u32,

    /// Ending address (exclusive)
    pub end: u32,
}

impl SourceMap {
    /// Create a new empty source map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `line` emitted `length` cells starting at `address`.
    pub fn add_mapping(&mut self, address: u32, line: usize, length: u32) {
        self.address_to_source
            .push((address, SourceLocation { line, length }));
        self.source_to_address.push((
            line,
            AddressRange {
                start: address,
                end: address.saturating_add(length),
            },
        ));
    }

    /// Source location of the line whose output starts at `address`
    pub fn get_source_location(&self, address: u32) -> Option<SourceLocation> {
        self.address_to_source
            .binary_search_by_key(&address, |(addr, _)| *addr)
            .ok()
            .map(|idx| self.address_to_source[idx].1)
    }

    /// Source location of the line whose output covers `address`
    pub fn find_containing(&self, address: u32) -> Option<SourceLocation> {
        let idx = self
            .address_to_source
            .partition_point(|(addr, _)| *addr <= address);
        let (start, location) = *self.address_to_source.get(idx.checked_sub(1)?)?;
        (address < start.saturating_add(location.length)).then_some(location)
    }

    /// Get address range for a given source line
    pub fn get_address_range(&self, line: usize) -> Option<AddressRange> {
        self.source_to_address
            .binary_search_by_key(&line, |(l, _)| *l)
            .ok()
            .map(|idx| self.source_to_address[idx].1)
    }

    /// Finalize the source map (sort for binary search)
    pub fn finalize(&mut self) {
        self.address_to_source.sort_by_key(|(addr, _)| *addr);
        self.source_to_address.sort_by_key(|(line, _)| *line);
    }

    pub fn len(&self) -> usize {
        self.address_to_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.address_to_source.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceMap {
        let mut map = SourceMap::new();
        map.add_mapping(0x0602, 2, 3);
        map.add_mapping(0x0600, 1, 2);
        map.finalize();
        map
    }

    #[test]
    fn test_source_map_add_lookup() {
        let map = sample();

        assert_eq!(map.get_source_location(0x0600).unwrap().line, 1);
        assert_eq!(map.get_source_location(0x0602).unwrap().length, 3);
        assert!(map.get_source_location(0x0601).is_none());
    }

    #[test]
    fn test_find_containing() {
        let map = sample();

        assert_eq!(map.find_containing(0x0601).unwrap().line, 1);
        assert_eq!(map.find_containing(0x0604).unwrap().line, 2);
        assert!(map.find_containing(0x0605).is_none());
        assert!(map.find_containing(0x05FF).is_none());
    }

    #[test]
    fn test_address_range_by_line() {
        let map = sample();

        assert_eq!(
            map.get_address_range(2),
            Some(AddressRange {
                start: 0x0602,
                end: 0x0605
            })
        );
        assert!(map.get_address_range(3).is_none());
    }
}
