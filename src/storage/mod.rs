pub(crate) mod csv_file;
