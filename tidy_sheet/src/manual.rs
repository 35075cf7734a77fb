/*!

This is the long-form manual for `tidy_sheet` and `pandemic-history`.

## Datasets

The command line program loads the datasets of the *Bridging the Gap* project on
the history of pandemics in Switzerland. They are expected in one data directory
(`Data` by default):

* `1_History_Pandemics.xlsx` influenza and COVID deaths per 100 000 inhabitants
* `2_All_cantons_1953-1958_Mortality.xlsx` monthly deaths per canton
* `2_Data_cantons_incidence_weekly_56_58_NEW.xlsx` weekly influenza cases per canton
* `2_Population_cantons.xlsx` population per canton
* `3_Todesursachen Schweiz ohne Alter 1876-2002.xlsx` causes of death, 1876 to 2002
* `full_data.csv` daily COVID statistics, one row per location and day

### Derived files

Two files are derived from the causes of death workbook the first time they are
needed, and reused afterwards:

* `data_set3_cleaned.csv` the whole table, with the three header rows of the
  workbook merged into one name per column, such as
  `Infektionskrankheiten | Pocken | Total`.
* `dataset_3_cleaned_infectious_diseases.csv` the first eight columns of the
  `Tabelle1` worksheet: `Year, Total, Smallpox, Scarlet_Fever, Measles,
  Typhoid_Paratyphoid, Diphtheria, Whooping_Cough`.

A derived file is only rebuilt when it is missing. Delete it, or pass `--refresh`,
after updating the workbook. `--verify` rebuilds both files in memory and reports
any difference with the files on disk.

## Configuration

All the settings are optional. The configuration is a JSON file:

```json
{
  "dataDirectory": "Data",
  "causesOfDeath": {
    "worksheetName": "Tabelle1",
    "headerDelimiter": " | ",
    "firstHeaderRow": 4,
    "lastHeaderRow": 6,
    "firstDataRow": 10,
    "infectiousHeaderRow": 6,
    "infectiousFirstDataRow": 8
  }
}
```

Rows are counted from 0, starting at the first used row of the worksheet.

## Header rules

Stacked headers: every header row is filled from left to right (a blank cell takes
the label on its left), then the labels of a column are joined from top to bottom.
Blank labels are skipped.

Single header rows: a blank header cell is named `Unnamed_<column>`. A name that
was already used gets a suffix: the second `Total` becomes `Total_2`, the third
`Total_3`. A suffix already used in the row is skipped: `Total, Total, Total_2`
becomes `Total, Total_3, Total_2`.

*/
