// The OGG variant of CRC-32: polynomial 0x04C11DB7, no reflection, zero initial value
const CRC_TABLE: [u32; 256] = {
	let mut table = [0_u32; 256];

	let mut i = 0;
	while i < 256 {
		let mut crc = (i as u32) << 24;

		let mut bit = 0;
		while bit < 8 {
			crc = if crc & 0x8000_0000 == 0 {
				crc << 1
			} else {
				(crc << 1) ^ 0x04C1_1DB7
			};
			bit += 1;
		}

		table[i] = crc;
		i += 1;
	}

	table
};

/// Generates a CRC checksum of `data` as used by OGG pages
pub fn crc32(data: &[u8]) -> u32 {
	let mut crc = 0_u32;

	for &byte in data {
		crc = (crc << 8) ^ CRC_TABLE[(((crc >> 24) as u8) ^ byte) as usize];
	}

	crc
}
