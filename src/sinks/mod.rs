pub mod credentials_file;
