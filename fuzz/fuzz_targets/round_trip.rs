#![no_main]
use dset::ColumnRead;
use dset_fuzz::Table;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|table: Table| {
    let buf = table.encode();
    let result = dset::from_bytes(&buf);
    if !table.rows_agree() {
        assert!(result.is_err());
        return;
    }
    let dataset = result.unwrap();
    assert_eq!(dataset.columns_count(), table.columns.len());
    for ((field, expected), column) in table.columns.iter().zip(dataset.columns()) {
        assert_eq!(column.name(), field);
        let cells = expected.cells();
        assert_eq!(column.len(), cells.len());
        for (row, cell) in cells.iter().enumerate() {
            assert!(cell.matches(column.cell(row)));
        }
    }
});
